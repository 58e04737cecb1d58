//! HTTP DTOs for intake endpoints.
//!
//! Wire format is camelCase JSON. Session state is returned as-is.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ErrorCode;
use crate::domain::schema::FlowSchema;
use crate::domain::session::SessionState;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/chat body. Both fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub topic_id: Option<String>,
    #[serde(default)]
    pub step_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchConfigRequest {
    #[serde(default)]
    pub config_name: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
    pub state: SessionState,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub state: SessionState,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavigateResponse {
    pub state: SessionState,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigListResponse {
    pub configs: Vec<String>,
    pub current_config: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchConfigResponse {
    pub success: bool,
    pub current_config: String,
    pub config: FlowSchema,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn session_not_found() -> Self {
        Self::new(ErrorCode::SessionNotFound, "Session not found")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_accepts_empty_body() {
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(req.session_id.is_none());
        assert!(req.message.is_none());
    }

    #[test]
    fn navigate_request_reads_camel_case() {
        let req: NavigateRequest =
            serde_json::from_str(r#"{"sessionId":"s","topicId":"t","stepId":"p"}"#).unwrap();
        assert_eq!(req.topic_id.as_deref(), Some("t"));
        assert_eq!(req.step_id.as_deref(), Some("p"));
    }

    #[test]
    fn error_response_uses_wire_code() {
        let json = serde_json::to_value(ErrorResponse::new(ErrorCode::TopicNotComplete, "x")).unwrap();
        assert_eq!(json["code"], "NOT_COMPLETE");
        assert_eq!(json["message"], "x");
    }

    #[test]
    fn config_list_serializes_camel_case() {
        let json = serde_json::to_value(ConfigListResponse {
            configs: vec!["a".into()],
            current_config: "a".into(),
        })
        .unwrap();
        assert_eq!(json["currentConfig"], "a");
    }
}
