// Interaction controller: owns the interaction state and sequences the two
// user-triggered flows (ask, upload). State transitions live in the pure
// `update` function; `Controller` executes the effects it emits against a
// `Concierge` and feeds the results back in.

use async_trait::async_trait;
use tracing::{debug, error};

use crate::api::{ApiClient, Document, UPLOAD_FALLBACK};

pub const WEATHER_QUERY: &str = "weather";
pub const WEB_SEARCH_SUFFIX: &str = " (search online)";

pub const EMPTY_QUERY_MESSAGE: &str = "⚠️ Please enter a question.";
pub const ASK_FAILED_MESSAGE: &str = "⚠️ Something went wrong.";
pub const NO_FILE_MESSAGE: &str = "⚠️ Please select a file first.";
pub const UPLOADING_MESSAGE: &str = "⏳ Uploading...";

/// Which backend path a question takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Q&A over the uploaded business documents.
    #[default]
    Business,
    Web,
    Weather,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Business, Mode::Web, Mode::Weather];

    pub fn label(self) -> &'static str {
        match self {
            Mode::Business => "📖 Ask Business",
            Mode::Web => "🌍 Search Web",
            Mode::Weather => "☀️ Get Weather",
        }
    }
}

/// The literal string sent to `/ask` for a mode and the typed question.
pub fn transform_query(mode: Mode, query_text: &str) -> String {
    match mode {
        Mode::Weather => WEATHER_QUERY.to_string(),
        Mode::Web => format!("{query_text}{WEB_SEARCH_SUFFIX}"),
        Mode::Business => query_text.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionState {
    query_text: String,
    mode: Mode,
    is_loading: bool,
    is_uploading: bool,
    selected_file: Option<Document>,
    response_text: Option<String>,
    upload_status: Option<String>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// True only while an ask request is in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// True only while an upload request is in flight.
    pub fn is_uploading(&self) -> bool {
        self.is_uploading
    }

    pub fn selected_file(&self) -> Option<&Document> {
        self.selected_file.as_ref()
    }

    pub fn response_text(&self) -> Option<&str> {
        self.response_text.as_deref()
    }

    pub fn upload_status(&self) -> Option<&str> {
        self.upload_status.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the question.
    QueryChanged(String),
    ModeSelected(Mode),
    /// User picked (or cleared) the document to upload.
    FileSelected(Option<Document>),
    AskClicked,
    /// Outcome of an `Effect::Ask`. `Err` carries the failure description.
    AskResolved(Result<String, String>),
    UploadClicked,
    /// Outcome of an `Effect::Upload`.
    UploadResolved(Result<String, String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Ask { query: String },
    Upload { document: Document },
}

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: InteractionState, msg: Msg) -> (InteractionState, Vec<Effect>) {
    let effects = match msg {
        Msg::QueryChanged(text) => {
            state.query_text = text;
            Vec::new()
        }
        Msg::ModeSelected(mode) => {
            state.mode = mode;
            Vec::new()
        }
        Msg::FileSelected(document) => {
            state.selected_file = document;
            Vec::new()
        }
        Msg::AskClicked => {
            // One ask in flight at a time.
            if state.is_loading {
                return (state, Vec::new());
            }
            if state.mode != Mode::Weather && state.query_text.trim().is_empty() {
                state.response_text = Some(EMPTY_QUERY_MESSAGE.to_string());
                return (state, Vec::new());
            }
            state.is_loading = true;
            vec![Effect::Ask {
                query: transform_query(state.mode, &state.query_text),
            }]
        }
        Msg::AskResolved(outcome) => {
            if !state.is_loading {
                return (state, Vec::new());
            }
            state.is_loading = false;
            state.response_text = Some(match outcome {
                Ok(text) => text,
                Err(_) => ASK_FAILED_MESSAGE.to_string(),
            });
            Vec::new()
        }
        Msg::UploadClicked => {
            if state.is_uploading {
                return (state, Vec::new());
            }
            match state.selected_file.clone() {
                None => {
                    state.upload_status = Some(NO_FILE_MESSAGE.to_string());
                    Vec::new()
                }
                Some(document) => {
                    state.is_uploading = true;
                    state.upload_status = Some(UPLOADING_MESSAGE.to_string());
                    vec![Effect::Upload { document }]
                }
            }
        }
        Msg::UploadResolved(outcome) => {
            if !state.is_uploading {
                return (state, Vec::new());
            }
            state.is_uploading = false;
            state.upload_status = Some(match outcome {
                Ok(text) => text,
                Err(_) => UPLOAD_FALLBACK.to_string(),
            });
            Vec::new()
        }
    };

    (state, effects)
}

/// The two backend operations the controller depends on.
#[async_trait]
pub trait Concierge: Send + Sync {
    async fn ask(&self, query: &str) -> anyhow::Result<String>;
    async fn upload(&self, document: &Document) -> anyhow::Result<String>;
}

/// `ApiClient` already folds transport failures into fallback text, so it
/// never returns `Err` here.
#[async_trait]
impl Concierge for ApiClient {
    async fn ask(&self, query: &str) -> anyhow::Result<String> {
        Ok(ApiClient::ask(self, query).await)
    }

    async fn upload(&self, document: &Document) -> anyhow::Result<String> {
        Ok(ApiClient::upload(self, document).await)
    }
}

pub struct Controller<C> {
    client: C,
    state: InteractionState,
}

impl<C: Concierge> Controller<C> {
    pub fn new(client: C) -> Self {
        Controller {
            client,
            state: InteractionState::new(),
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Apply one message without running its effects.
    pub fn apply(&mut self, msg: Msg) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let (next, effects) = update(state, msg);
        self.state = next;
        effects
    }

    /// Execute an effect and return the message that resolves it.
    pub async fn run(&self, effect: Effect) -> Msg {
        match effect {
            Effect::Ask { query } => {
                debug!(%query, "Dispatching ask");
                let outcome = match self.client.ask(&query).await {
                    Ok(text) => Ok(text),
                    Err(e) => {
                        let detail = format!("{e:#}");
                        error!(error = %detail, "Ask raised instead of returning a fallback");
                        Err(detail)
                    }
                };
                Msg::AskResolved(outcome)
            }
            Effect::Upload { document } => {
                debug!(file = %document.path().display(), "Dispatching upload");
                let outcome = match self.client.upload(&document).await {
                    Ok(text) => Ok(text),
                    Err(e) => {
                        let detail = format!("{e:#}");
                        error!(error = %detail, "Upload raised instead of returning a fallback");
                        Err(detail)
                    }
                };
                Msg::UploadResolved(outcome)
            }
        }
    }

    /// Apply a message and run every effect it triggers to completion.
    pub async fn dispatch(&mut self, msg: Msg) {
        let mut pending = self.apply(msg);
        while let Some(effect) = pending.pop() {
            let resolution = self.run(effect).await;
            pending.extend(self.apply(resolution));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn step(state: InteractionState, msg: Msg) -> (InteractionState, Vec<Effect>) {
        update(state, msg)
    }

    #[test]
    fn weather_mode_always_sends_literal() {
        assert_eq!(transform_query(Mode::Weather, ""), "weather");
        assert_eq!(transform_query(Mode::Weather, "rain in Sonoma?"), "weather");
    }

    #[test]
    fn web_mode_appends_search_hint() {
        assert_eq!(
            transform_query(Mode::Web, "pinot noir"),
            "pinot noir (search online)"
        );
    }

    #[test]
    fn business_mode_is_identity() {
        for text in ["", "  ", "Which reds pair with lamb?"] {
            assert_eq!(transform_query(Mode::Business, text), text);
        }
    }

    #[test]
    fn defaults_match_fresh_session() {
        let state = InteractionState::new();
        assert_eq!(state.query_text(), "");
        assert_eq!(state.mode(), Mode::Business);
        assert!(!state.is_loading());
        assert!(state.selected_file().is_none());
        assert!(state.response_text().is_none());
        assert!(state.upload_status().is_none());
    }

    #[test]
    fn blank_business_question_is_rejected_without_effect() {
        let (state, _) = step(InteractionState::new(), Msg::QueryChanged("   ".into()));
        let (state, effects) = step(state, Msg::AskClicked);

        assert!(effects.is_empty());
        assert!(!state.is_loading());
        assert_eq!(state.response_text(), Some(EMPTY_QUERY_MESSAGE));
    }

    #[test]
    fn blank_question_is_fine_in_weather_mode() {
        let (state, _) = step(InteractionState::new(), Msg::ModeSelected(Mode::Weather));
        let (state, effects) = step(state, Msg::AskClicked);

        assert_eq!(
            effects,
            vec![Effect::Ask {
                query: "weather".into()
            }]
        );
        assert!(state.is_loading());
    }

    #[test]
    fn loading_spans_dispatch_to_resolution() {
        let (state, _) = step(InteractionState::new(), Msg::QueryChanged("Best Merlot?".into()));
        assert!(!state.is_loading());

        let (state, effects) = step(state, Msg::AskClicked);
        assert_eq!(effects.len(), 1);
        assert!(state.is_loading());

        let (state, _) = step(state, Msg::AskResolved(Ok("Duckhorn.".into())));
        assert!(!state.is_loading());
        assert_eq!(state.response_text(), Some("Duckhorn."));
    }

    #[test]
    fn second_ask_while_loading_is_ignored() {
        let (state, _) = step(InteractionState::new(), Msg::QueryChanged("Best Merlot?".into()));
        let (state, _) = step(state, Msg::AskClicked);
        let before = state.clone();

        let (state, effects) = step(state, Msg::AskClicked);
        assert!(effects.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn failed_ask_shows_generic_message() {
        let (state, _) = step(InteractionState::new(), Msg::QueryChanged("x".into()));
        let (state, _) = step(state, Msg::AskClicked);
        let (state, _) = step(state, Msg::AskResolved(Err("boom".into())));

        assert!(!state.is_loading());
        assert_eq!(state.response_text(), Some(ASK_FAILED_MESSAGE));
    }

    #[test]
    fn stray_resolution_is_ignored() {
        let state = InteractionState::new();
        let (next, effects) = step(state.clone(), Msg::AskResolved(Ok("late".into())));
        assert!(effects.is_empty());
        assert_eq!(next, state);

        let (next, _) = step(state.clone(), Msg::UploadResolved(Ok("late".into())));
        assert_eq!(next, state);
    }

    #[test]
    fn upload_without_file_is_rejected() {
        let (state, effects) = step(InteractionState::new(), Msg::UploadClicked);
        assert!(effects.is_empty());
        assert_eq!(state.upload_status(), Some(NO_FILE_MESSAGE));
    }

    #[test]
    fn upload_reports_progress_then_result() {
        let doc = Document::new("cellar.pdf");
        let (state, _) = step(InteractionState::new(), Msg::FileSelected(Some(doc.clone())));
        let (state, effects) = step(state, Msg::UploadClicked);

        assert_eq!(effects, vec![Effect::Upload { document: doc }]);
        assert_eq!(state.upload_status(), Some(UPLOADING_MESSAGE));
        assert!(state.is_uploading());

        let (state, effects) = step(state, Msg::UploadClicked);
        assert!(effects.is_empty());

        let (state, _) = step(state, Msg::UploadResolved(Err("disk full".into())));
        assert!(!state.is_uploading());
        assert_eq!(state.upload_status(), Some(UPLOAD_FALLBACK));
    }

    #[test]
    fn upload_does_not_touch_ask_state() {
        let (state, _) = step(InteractionState::new(), Msg::QueryChanged("Zinfandel?".into()));
        let (state, _) = step(state, Msg::AskClicked);
        let (state, _) = step(state, Msg::FileSelected(Some(Document::new("a.txt"))));
        let (state, effects) = step(state, Msg::UploadClicked);

        assert_eq!(effects.len(), 1);
        assert!(state.is_loading());
        assert!(state.response_text().is_none());
    }
}
