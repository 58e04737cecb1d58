//! HTTP routes for intake endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    chat, export_summary, get_config, get_session, health, list_configs, navigate, switch_config,
    IntakeHandlers,
};

/// Creates the intake router. Mounted under `/api` by `api_router`.
pub fn intake_routes(handlers: IntakeHandlers) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/session/:id", get(get_session))
        .route("/navigate", post(navigate))
        .route("/docx", post(export_summary))
        .route("/config", get(get_config))
        .route("/configs/list", get(list_configs))
        .route("/configs/switch", post(switch_config))
        .route("/health", get(health))
        .with_state(handlers)
}
