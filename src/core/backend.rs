use crate::core::VideoId;
use crate::error::{Error, Result};
use async_trait::async_trait;
use derive_more::Display;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const CHAT_PATH: &str = "/api/chat";

/// Shown when the backend rejects a request without a usable `detail`.
pub const BACKEND_FALLBACK_ERROR: &str = "Failed to get answer from backend.";

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub video_id: VideoId,
    pub query: String,
}

#[derive(Debug, Deserialize)]
struct ChatAnswer {
    answer: String,
}

/// Why a question did not produce an answer. `Display` is the text shown to
/// the user.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum BackendError {
    /// The backend replied with a non-success status.
    #[display("{message}")]
    Rejected { status: u16, message: String },

    /// The request never completed, or the reply could not be decoded.
    #[display("{_0}")]
    Transport(String),
}

impl std::error::Error for BackendError {}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn ask(&self, request: &ChatRequest) -> std::result::Result<String, BackendError>;
}

/// [`ChatBackend`] speaking JSON over HTTP to the RAG service.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        let endpoint = format!("{}{CHAT_PATH}", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| Error::config(format!("invalid backend URL '{base_url}': {e}")))?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "backend URL must use http or https, got '{base_url}'"
            )));
        }

        Ok(Self {
            client: Client::builder().build()?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn ask(&self, request: &ChatRequest) -> std::result::Result<String, BackendError> {
        debug!(endpoint = %self.endpoint, video_id = %request.video_id, "sending question");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "backend request failed");
                BackendError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_detail(&body).unwrap_or_else(|| BACKEND_FALLBACK_ERROR.to_string());
            warn!(status = status.as_u16(), %message, "backend rejected question");
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let answer: ChatAnswer = response.json().await.map_err(|e| {
            warn!(error = %e, "could not decode backend answer");
            BackendError::Transport(format!("Malformed response from backend: {e}"))
        })?;

        debug!(len = answer.answer.len(), "answer received");
        Ok(answer.answer)
    }
}

/// Pull a string `detail` out of an error body, if there is one.
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) if !detail.is_empty() => Some(detail.clone()),
        _ => None,
    }
}
