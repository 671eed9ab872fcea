pub mod client;
pub mod request;
pub mod response;
pub mod selector;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::Value;

use crate::config::ApiKey;

pub use client::GeminiClient;
pub use selector::ModelSelector;

#[derive(thiserror::Error, Debug)]
pub enum UpstreamError {
    #[error("request to Gemini failed: {0}")]
    Transport(reqwest::Error),

    #[error("Gemini returned a non-JSON body: {0}")]
    InvalidBody(String),

    #[error("Gemini returned {status}: {body}")]
    Status { status: StatusCode, body: Value },

    #[error("Gemini response contained no text candidate")]
    MissingText,
}

/// Upstream status and body, exactly as Gemini answered.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

impl UpstreamReply {
    /// Turns a non-success status into an error, for callers that reshape the body.
    pub fn into_success(self) -> Result<Value, UpstreamError> {
        if self.status.is_success() {
            Ok(self.body)
        } else {
            Err(UpstreamError::Status {
                status: self.status,
                body: self.body,
            })
        }
    }
}

#[async_trait]
pub trait GenerativeApi: Send + Sync {
    /// One `generateContent` call against `model`. No retries.
    async fn generate_content(
        &self,
        key: &ApiKey,
        model: &str,
        body: &Value,
    ) -> Result<UpstreamReply, UpstreamError>;
}
