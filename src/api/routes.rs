use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use crate::config::{ApiKey, Config, Models};
use crate::gemini::{GenerativeApi, ModelSelector};

pub struct AppState {
    pub api_key: Option<ApiKey>,
    pub models: Models,
    pub selector: ModelSelector,
    pub max_body_bytes: usize,
    pub upstream: Arc<dyn GenerativeApi>,
}

impl AppState {
    pub fn new(config: &Config, upstream: Arc<dyn GenerativeApi>) -> Self {
        Self {
            api_key: config.api_key.clone(),
            models: config.models.clone(),
            selector: ModelSelector::for_proxy(&config.models),
            max_body_bytes: config.max_body_bytes,
            upstream,
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // Method checks happen in the handlers, after the key check.
    Router::new()
        .route("/api", any(handlers::proxy))
        .route("/api/chat", any(handlers::chat))
        .route(
            "/api/health",
            get(handlers::health).fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(state.max_body_bytes)),
        )
        .with_state(state)
}
