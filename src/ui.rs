// UI layer: an interactive menu built on `dialoguer`. It only collects
// input and renders state; every decision goes through the controller.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::style::Stylize;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::api::{ApiClient, Document};
use crate::config::DEFAULT_LOCATION;
use crate::controller::{Controller, Mode, Msg};

/// Main interactive menu. Probes the backend once, then runs a select
/// loop until the user chooses "Exit".
pub async fn main_menu(api: ApiClient) -> Result<()> {
    println!("{}", "🍷 Napa Valley Wine Concierge".bold().magenta());
    let banner = api.status().await;
    println!("{}", banner.dim());
    info!(base_url = api.base_url(), "Concierge menu started");

    let mut controller = Controller::new(api);
    loop {
        let state = controller.state();
        let mode_item = format!("Mode: {}", state.mode().label());
        let file_item = match state.selected_file() {
            Some(doc) => format!("Select document (current: {})", doc.file_name()),
            None => "Select document".to_string(),
        };
        let items = vec![
            "Ask".to_string(),
            mode_item,
            file_item,
            "Upload document".to_string(),
            "Weather lookup".to_string(),
            "Exit".to_string(),
        ];
        let selection = Select::new().items(&items).default(0).interact()?;
        match selection {
            0 => handle_ask(&mut controller).await?,
            1 => {
                let labels: Vec<&str> = Mode::ALL.iter().map(|m| m.label()).collect();
                let current = Mode::ALL
                    .iter()
                    .position(|m| *m == controller.state().mode())
                    .unwrap_or(0);
                let idx = Select::new().items(&labels).default(current).interact()?;
                controller.apply(Msg::ModeSelected(Mode::ALL[idx]));
            }
            2 => {
                let raw: String = Input::new()
                    .with_prompt("Document path (.pdf or .txt, empty to clear)")
                    .allow_empty(true)
                    .interact_text()?;
                let document = match raw.trim() {
                    "" => None,
                    path => Some(Document::new(expand_home(path))),
                };
                controller.apply(Msg::FileSelected(document));
            }
            3 => handle_upload(&mut controller).await?,
            4 => handle_weather(controller.client()).await?,
            5 => break,
            _ => {}
        }
    }
    Ok(())
}

/// Prompt for the question (skipped in weather mode) and run the ask flow.
async fn handle_ask(controller: &mut Controller<ApiClient>) -> Result<()> {
    if controller.state().mode() != Mode::Weather {
        let query: String = Input::new()
            .with_prompt("Type your question here")
            .with_initial_text(controller.state().query_text())
            .allow_empty(true)
            .interact_text()?;
        controller.apply(Msg::QueryChanged(query));
    }

    let effects = controller.apply(Msg::AskClicked);
    for effect in effects {
        let spinner = spinner("⏳ Thinking...")?;
        let resolution = controller.run(effect).await;
        spinner.finish_and_clear();
        controller.apply(resolution);
    }

    if let Some(text) = controller.state().response_text() {
        println!("{} {}", "Concierge:".bold().magenta(), text);
    }
    Ok(())
}

async fn handle_upload(controller: &mut Controller<ApiClient>) -> Result<()> {
    let effects = controller.apply(Msg::UploadClicked);
    for effect in effects {
        let message = controller.state().upload_status().unwrap_or_default().to_string();
        let spinner = spinner(&message)?;
        let resolution = controller.run(effect).await;
        spinner.finish_and_clear();
        controller.apply(resolution);
    }

    if let Some(status) = controller.state().upload_status() {
        println!("{status}");
    }
    Ok(())
}

/// Direct call to the weather endpoint for an explicit location.
async fn handle_weather(api: &ApiClient) -> Result<()> {
    let location: String = Input::new()
        .with_prompt("Location")
        .default(DEFAULT_LOCATION.to_string())
        .interact_text()?;
    let spinner = spinner("Fetching weather...")?;
    let report = api.weather(&location).await;
    spinner.finish_and_clear();
    println!("{} {}", "Weather:".bold().yellow(), report);
    Ok(())
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

/// Expand a leading `~/` to the user's home directory.
fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_untouched() {
        assert_eq!(expand_home("docs/menu.pdf"), PathBuf::from("docs/menu.pdf"));
        assert_eq!(expand_home("/tmp/a.txt"), PathBuf::from("/tmp/a.txt"));
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/wine/notes.txt"), home.join("wine/notes.txt"));
        }
    }
}
