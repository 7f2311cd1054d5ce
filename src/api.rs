// API client module: a small async HTTP client that talks to the wine
// concierge backend. Each backend operation comes in two flavours:
// `try_*` returns the structured `ApiError`, and the plain variant folds
// every failure into a fixed, display-ready fallback string.

use std::path::{Path, PathBuf};

use anyhow::Context;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

use crate::config::Settings;

pub const ASK_FALLBACK: &str = "⚠️ Failed to reach concierge service.";
pub const WEATHER_FALLBACK: &str = "⚠️ Weather service unavailable.";
pub const UPLOAD_FALLBACK: &str = "⚠️ Upload failed.";
pub const STATUS_FALLBACK: &str = "⚠️ Concierge service offline.";

/// Everything that can go wrong between us and the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// HTTP status for server-side failures, `None` for everything else.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Body of `POST /ask`.
#[derive(Serialize, Debug)]
struct AskRequest<'a> {
    query: &'a str,
}

/// Every backend endpoint wraps its answer as `{ "response": "..." }`.
#[derive(Deserialize, Debug)]
struct Envelope {
    response: String,
}

/// A document picked by the user for upload. The file is only read when
/// the upload is actually sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Document { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name sent as the multipart filename; the backend stores the
    /// upload under this name.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("document")
            .to_string()
    }

    /// The backend indexes PDF and plain-text documents.
    pub fn mime_type(&self) -> &'static str {
        let ext = self
            .path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("pdf") => "application/pdf",
            Some("txt") => "text/plain",
            _ => "application/octet-stream",
        }
    }
}

/// Async client bound to one backend origin.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: settings.base_url.clone(),
        })
    }

    /// Client configured from `CONCIERGE_API_URL` or the local default.
    pub fn from_env() -> anyhow::Result<Self> {
        ApiClient::new(&Settings::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Ask the concierge. Never fails: errors become [`ASK_FALLBACK`].
    pub async fn ask(&self, query: &str) -> String {
        match self.try_ask(query).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, status = ?e.status(), "Ask concierge failed");
                ASK_FALLBACK.to_string()
            }
        }
    }

    /// Weather for a location. Never fails: errors become [`WEATHER_FALLBACK`].
    pub async fn weather(&self, location: &str) -> String {
        match self.try_weather(location).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, status = ?e.status(), "Weather lookup failed");
                WEATHER_FALLBACK.to_string()
            }
        }
    }

    /// Upload a document. Never fails: errors become [`UPLOAD_FALLBACK`].
    pub async fn upload(&self, document: &Document) -> String {
        match self.try_upload(document).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, status = ?e.status(), "Upload failed");
                UPLOAD_FALLBACK.to_string()
            }
        }
    }

    /// Backend banner from `GET /`. Never fails: errors become [`STATUS_FALLBACK`].
    pub async fn status(&self) -> String {
        match self.try_status().await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Concierge health probe failed");
                STATUS_FALLBACK.to_string()
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn try_ask(&self, query: &str) -> Result<String, ApiError> {
        let url = self.endpoint("/ask");
        let res = self
            .client
            .post(&url)
            .json(&AskRequest { query })
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        read_envelope(url, res).await
    }

    #[instrument(skip(self))]
    pub async fn try_weather(&self, location: &str) -> Result<String, ApiError> {
        let url = self.endpoint("/weather");
        let res = self
            .client
            .get(&url)
            .query(&[("location", location)])
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        read_envelope(url, res).await
    }

    #[instrument(skip(self, document), fields(file = %document.path().display()))]
    pub async fn try_upload(&self, document: &Document) -> Result<String, ApiError> {
        let url = self.endpoint("/upload");
        let bytes = tokio::fs::read(document.path())
            .await
            .map_err(|source| ApiError::Io {
                path: document.path().to_path_buf(),
                source,
            })?;
        debug!(len = bytes.len(), mime = document.mime_type(), "Sending document");

        let part = Part::bytes(bytes)
            .file_name(document.file_name())
            .mime_str(document.mime_type())
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        let form = Form::new().part("file", part);

        let res = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        read_envelope(url, res).await
    }

    #[instrument(skip(self))]
    pub async fn try_status(&self) -> Result<String, ApiError> {
        let url = self.endpoint("/");
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        read_envelope(url, res).await
    }
}

/// Check the status and pull `response` out of the JSON envelope. On a
/// failed status the backend usually still sends `{ "response": "⚠️ ..." }`;
/// that text is kept as the error body, otherwise the raw body is.
async fn read_envelope(url: String, res: Response) -> Result<String, ApiError> {
    let status = res.status();
    if !status.is_success() {
        let txt = res.text().await.unwrap_or_default();
        let body = serde_json::from_str::<Envelope>(&txt)
            .map(|e| e.response)
            .unwrap_or(txt);
        return Err(ApiError::Status { url, status, body });
    }
    let envelope: Envelope = res
        .json()
        .await
        .map_err(|source| ApiError::Decode {
            url: url.clone(),
            source,
        })?;
    debug!(%url, "Received concierge response");
    Ok(envelope.response)
}
