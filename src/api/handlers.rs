use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use super::{ChatResponse, HealthResponse, TtsPayload, TtsResponse};
use crate::api::routes::AppState;
use crate::config::ApiKey;
use crate::error::AppError;
use crate::gemini::request::{chat_request, tts_request};
use crate::gemini::response::GenerateContentResponse;
use crate::gemini::UpstreamError;

const CHAT_KEY_MISSING: &str =
    "Gemini API key is not configured. Please set the GEMINI_API_KEY environment variable.";
const CHAT_UPSTREAM_FAILED: &str = "An error occurred while processing your request.";
const TTS_AUDIO_MISSING: &str = "Failed to generate TTS audio.";

const PROXY_KEY_MISSING: &str = "API key is not configured.";
const PROXY_UPSTREAM_FAILED: &str = "Failed to communicate with the Gemini API.";

/// Action dispatch: `{ action: "chat" | "tts", payload }`.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let key = state
        .api_key
        .as_ref()
        .ok_or(AppError::Configuration(CHAT_KEY_MISSING))?;

    if method != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }
    let body = read_body(body)?;

    // An empty body reads as `{}` and fails the field check below.
    let mut request = if body.is_empty() {
        Value::Object(Default::default())
    } else {
        parse_json(&body)?
    };

    let action = request.get("action").filter(|v| is_truthy(v)).cloned();
    let payload = request
        .get_mut("payload")
        .filter(|v| is_truthy(v))
        .map(Value::take);

    let (Some(action), Some(payload)) = (action, payload) else {
        return Err(AppError::BadRequest(
            "Missing `action` or `payload` in request body".into(),
        ));
    };

    match action.as_str() {
        Some("chat") => generate_text(&state, key, payload).await,
        Some("tts") => generate_speech(&state, key, payload).await,
        _ => Err(AppError::BadRequest("Invalid action".into())),
    }
}

async fn generate_text(
    state: &AppState,
    key: &ApiKey,
    payload: Value,
) -> Result<Response, AppError> {
    let model = &state.models.chat;
    tracing::info!("Chat request -> {}", model);

    let body = state
        .upstream
        .generate_content(key, model, &chat_request(payload))
        .await
        .and_then(|reply| reply.into_success())
        .map_err(upstream_failure)?;

    let text = GenerateContentResponse::from_value(&body)
        .text()
        .ok_or_else(|| upstream_failure(UpstreamError::MissingText))?;

    Ok(Json(ChatResponse { text }).into_response())
}

async fn generate_speech(
    state: &AppState,
    key: &ApiKey,
    payload: Value,
) -> Result<Response, AppError> {
    let tts: TtsPayload = serde_json::from_value(payload)
        .map_err(|_| AppError::BadRequest("Invalid tts payload".into()))?;

    let model = &state.models.tts;
    tracing::info!("TTS request -> {} (voice: {})", model, tts.voice);

    let body = state
        .upstream
        .generate_content(key, model, &tts_request(&tts.text, &tts.voice))
        .await
        .and_then(|reply| reply.into_success())
        .map_err(upstream_failure)?;

    let audio = GenerateContentResponse::from_value(&body)
        .inline_audio()
        .ok_or(AppError::UpstreamContract(TTS_AUDIO_MISSING))?;

    Ok(Json(TtsResponse {
        audio_data: audio.data,
        mime_type: audio.mime_type,
    })
    .into_response())
}

fn upstream_failure(source: UpstreamError) -> AppError {
    AppError::Upstream {
        message: CHAT_UPSTREAM_FAILED,
        source,
    }
}

/// Bare proxy: forwards the body to the selected model and relays
/// Gemini's status and body unchanged.
pub async fn proxy(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let key = state
        .api_key
        .as_ref()
        .ok_or(AppError::Configuration(PROXY_KEY_MISSING))?;

    if method != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }
    let body = read_body(body)?;

    if body.is_empty() {
        return Err(AppError::BadRequest("Missing request body".into()));
    }
    let request = parse_json(&body)?;

    let model = state.selector.select(&request);
    tracing::info!("Proxying generateContent -> {}", model);

    let reply = state
        .upstream
        .generate_content(key, model, &request)
        .await
        .map_err(|source| AppError::Upstream {
            message: PROXY_UPSTREAM_FAILED,
            source,
        })?;

    Ok((reply.status, Json(reply.body)).into_response())
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

pub async fn not_found(method: Method, uri: Uri) -> AppError {
    AppError::NotFound(format!("{} {}", method, uri.path()))
}

/// Body read failures (oversized, aborted) surface as JSON errors after the key check.
fn read_body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, AppError> {
    body.map_err(|rejection| {
        tracing::warn!("Failed to read request body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::BadRequest("Request body too large".into())
        } else {
            AppError::BadRequest("Failed to read request body".into())
        }
    })
}

fn parse_json(body: &[u8]) -> Result<Value, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!("Rejected malformed JSON body: {}", e);
        AppError::BadRequest("Invalid JSON body".into())
    })
}

/// `null`, `false`, `0`, and `""` count as absent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
