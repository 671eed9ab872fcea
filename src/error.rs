use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::gemini::UpstreamError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Configuration(&'static str),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid URL ({0})")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    UpstreamContract(&'static str),

    #[error("{message}")]
    Upstream {
        message: &'static str,
        #[source]
        source: UpstreamError,
    },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Configuration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR"),
            AppError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::UpstreamContract(_) => (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_CONTRACT"),
            AppError::Upstream { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // The client only ever sees the fixed message; the cause stays in the server log.
        match &self {
            AppError::Upstream { message, source } => {
                tracing::error!("Request failed: {} - {}: {}", code, message, source);
            }
            _ if status.is_server_error() => {
                tracing::error!("Request failed: {} - {}", code, self);
            }
            _ => {
                tracing::warn!("Request rejected: {} - {}", code, self);
            }
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn maps_taxonomy_to_status_codes() {
        assert_eq!(body_of(AppError::Configuration("no key")).await.0, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(AppError::MethodNotAllowed).await.0, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_of(AppError::BadRequest("x".into())).await.0, StatusCode::BAD_REQUEST);
        assert_eq!(
            body_of(AppError::UpstreamContract("no audio")).await.0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn upstream_detail_is_not_in_body() {
        let err = AppError::Upstream {
            message: "Something went wrong.",
            source: UpstreamError::InvalidBody("secret upstream detail".into()),
        };
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"error": "Something went wrong."}));
    }
}
