//! HTTP handlers for intake endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{
    ExportSummaryHandler, ExportSummaryQuery, GetActiveSchemaHandler, GetSessionHandler,
    GetSessionQuery, IntakeError, ListSchemasHandler, NavigateTopicCommand, NavigateTopicHandler,
    SchemaCommandError, SendChatCommand, SendChatHandler, SessionLocks, SwitchSchemaCommand,
    SwitchSchemaHandler,
};
use crate::domain::engine::TopicGraphEngine;
use crate::domain::foundation::{ErrorCode, SessionId};
use crate::ports::{SchemaProvider, SessionStore, SummaryRenderer};

use super::dto::{
    ChatRequest, ChatResponse, ConfigListResponse, ErrorResponse, HealthResponse,
    NavigateRequest, NavigateResponse, SessionResponse, SummaryRequest, SwitchConfigRequest,
    SwitchConfigResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct IntakeHandlers {
    send_chat: Arc<SendChatHandler>,
    get_session: Arc<GetSessionHandler>,
    navigate: Arc<NavigateTopicHandler>,
    export_summary: Arc<ExportSummaryHandler>,
    get_schema: Arc<GetActiveSchemaHandler>,
    list_schemas: Arc<ListSchemasHandler>,
    switch_schema: Arc<SwitchSchemaHandler>,
}

impl IntakeHandlers {
    /// Builds every handler over the same ports and one shared lock registry.
    pub fn new(
        store: Arc<dyn SessionStore>,
        schemas: Arc<dyn SchemaProvider>,
        engine: Arc<TopicGraphEngine>,
        renderer: Arc<dyn SummaryRenderer>,
    ) -> Self {
        let locks = SessionLocks::new();
        Self {
            send_chat: Arc::new(SendChatHandler::new(
                store.clone(),
                schemas.clone(),
                engine,
                locks.clone(),
            )),
            get_session: Arc::new(GetSessionHandler::new(store.clone())),
            navigate: Arc::new(NavigateTopicHandler::new(
                store.clone(),
                schemas.clone(),
                locks.clone(),
            )),
            export_summary: Arc::new(ExportSummaryHandler::new(
                store.clone(),
                schemas.clone(),
                renderer,
            )),
            get_schema: Arc::new(GetActiveSchemaHandler::new(schemas.clone())),
            list_schemas: Arc::new(ListSchemasHandler::new(schemas.clone())),
            switch_schema: Arc::new(SwitchSchemaHandler::new(schemas, store, locks)),
        }
    }
}

fn parse_session_id(raw: Option<&str>) -> Option<SessionId> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/chat - Process a chat message
pub async fn chat(
    State(handlers): State<IntakeHandlers>,
    Json(req): Json<ChatRequest>,
) -> Response {
    let cmd = SendChatCommand {
        session_id: parse_session_id(req.session_id.as_deref()),
        message: req.message,
    };

    match handlers.send_chat.handle(cmd).await {
        Ok(result) => {
            let response = ChatResponse {
                session_id: result.session_id.to_string(),
                reply: result.reply,
                state: result.state,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_intake_error(e),
    }
}

/// GET /api/session/:id - Get session state
pub async fn get_session(
    State(handlers): State<IntakeHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let Some(session_id) = parse_session_id(Some(&session_id)) else {
        return not_found();
    };

    match handlers.get_session.handle(GetSessionQuery { session_id }).await {
        Ok(state) => (StatusCode::OK, Json(SessionResponse { state })).into_response(),
        Err(e) => handle_intake_error(e),
    }
}

/// POST /api/navigate - Revisit a completed topic
pub async fn navigate(
    State(handlers): State<IntakeHandlers>,
    Json(req): Json<NavigateRequest>,
) -> Response {
    let Some(session_id) = parse_session_id(req.session_id.as_deref()) else {
        return not_found();
    };

    let cmd = NavigateTopicCommand {
        session_id,
        topic_id: req.topic_id.unwrap_or_default(),
        step_id: req.step_id,
    };

    match handlers.navigate.handle(cmd).await {
        Ok(result) => {
            let response = NavigateResponse {
                state: result.state,
                message: result.message,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_intake_error(e),
    }
}

/// POST /api/docx - Download the session summary
pub async fn export_summary(
    State(handlers): State<IntakeHandlers>,
    Json(req): Json<SummaryRequest>,
) -> Response {
    let Some(session_id) = parse_session_id(req.session_id.as_deref()) else {
        return not_found();
    };

    match handlers
        .export_summary
        .handle(ExportSummaryQuery { session_id })
        .await
    {
        Ok(document) => {
            let disposition = format!("attachment; filename=\"{}\"", document.file_name);
            let headers = [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_str(&document.content_type)
                        .unwrap_or(HeaderValue::from_static("application/octet-stream")),
                ),
                (
                    header::CONTENT_DISPOSITION,
                    HeaderValue::from_str(&disposition)
                        .unwrap_or(HeaderValue::from_static("attachment")),
                ),
            ];
            (StatusCode::OK, headers, document.bytes).into_response()
        }
        Err(e) => handle_intake_error(e),
    }
}

/// GET /api/config - Active schema
pub async fn get_config(State(handlers): State<IntakeHandlers>) -> Response {
    let view = handlers.get_schema.handle().await;
    (StatusCode::OK, Json(view.schema.as_ref().clone())).into_response()
}

/// GET /api/configs/list - Available schemas
pub async fn list_configs(State(handlers): State<IntakeHandlers>) -> Response {
    let listing = handlers.list_schemas.handle().await;
    let response = ConfigListResponse {
        configs: listing.configs,
        current_config: listing.current,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// POST /api/configs/switch - Change the active schema
pub async fn switch_config(
    State(handlers): State<IntakeHandlers>,
    Json(req): Json<SwitchConfigRequest>,
) -> Response {
    let cmd = SwitchSchemaCommand {
        name: req.config_name.unwrap_or_default(),
    };

    match handlers.switch_schema.handle(cmd).await {
        Ok(result) => {
            let response = SwitchConfigResponse {
                success: true,
                current_config: result.current,
                config: result.schema.as_ref().clone(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_schema_error(e),
    }
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::SessionNotFound | ErrorCode::SchemaNotFound => StatusCode::NOT_FOUND,
        ErrorCode::ValidationFailed | ErrorCode::InvalidTarget | ErrorCode::SessionIncomplete => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::TopicNotComplete => StatusCode::FORBIDDEN,
        ErrorCode::AIProviderError => StatusCode::BAD_GATEWAY,
        ErrorCode::StorageError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::session_not_found())).into_response()
}

fn handle_intake_error(error: IntakeError) -> Response {
    let code = error.code();
    let status = status_for(code);
    let message = match &error {
        IntakeError::SessionNotFound(_) => "Session not found".to_string(),
        IntakeError::SessionIncomplete(_) => "Session is not complete yet".to_string(),
        IntakeError::Navigation(e) if !e.is_invalid_target() => {
            "Can only navigate to completed topics".to_string()
        }
        IntakeError::InvalidTarget(_) | IntakeError::Navigation(_) => {
            "Invalid topic or step".to_string()
        }
        other => other.to_string(),
    };

    if status.is_server_error() {
        tracing::error!(error = %error, code = %code, "request failed");
    } else {
        tracing::debug!(error = %error, code = %code, "request rejected");
    }

    (status, Json(ErrorResponse::new(code, message))).into_response()
}

fn handle_schema_error(error: SchemaCommandError) -> Response {
    let code = error.code();
    let status = status_for(code);
    if status.is_server_error() {
        tracing::error!(error = %error, code = %code, "schema command failed");
    }
    (status, Json(ErrorResponse::new(code, error.to_string()))).into_response()
}
