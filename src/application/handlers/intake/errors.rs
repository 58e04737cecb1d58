//! Errors surfaced by the intake handlers.

use thiserror::Error;

use crate::domain::engine::{EngineError, NavigationError};
use crate::domain::foundation::{ErrorCode, SessionId, ValidationError};
use crate::ports::{RenderError, SessionStoreError};

/// Failure of an intake command or query.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    /// Target id is not a well-formed topic or step id.
    #[error("invalid navigation target: {0}")]
    InvalidTarget(String),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error("session {0} is not complete")]
    SessionIncomplete(SessionId),

    #[error("failed to render summary: {0}")]
    Render(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Storage(#[from] SessionStoreError),

    /// Active schema cannot start a session.
    #[error("invalid schema: {0}")]
    Schema(#[from] ValidationError),
}

impl IntakeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            IntakeError::SessionNotFound(_) => ErrorCode::SessionNotFound,
            IntakeError::InvalidTarget(_) => ErrorCode::InvalidTarget,
            IntakeError::Navigation(e) if e.is_invalid_target() => ErrorCode::InvalidTarget,
            IntakeError::Navigation(_) => ErrorCode::TopicNotComplete,
            IntakeError::SessionIncomplete(_) => ErrorCode::SessionIncomplete,
            IntakeError::Engine(EngineError::Provider(_)) => ErrorCode::AIProviderError,
            IntakeError::Storage(_) => ErrorCode::StorageError,
            IntakeError::Render(_) | IntakeError::Engine(_) | IntakeError::Schema(_) => {
                ErrorCode::InternalError
            }
        }
    }

    pub(crate) fn from_render(session_id: SessionId, err: RenderError) -> Self {
        match err {
            RenderError::Incomplete(_) => IntakeError::SessionIncomplete(session_id),
            RenderError::Failed(message) => IntakeError::Render(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TopicId;
    use crate::ports::AIError;

    #[test]
    fn maps_navigation_errors_to_codes() {
        let topic = TopicId::new("a").unwrap();
        assert_eq!(
            IntakeError::from(NavigationError::UnknownTopic(topic.clone())).code(),
            ErrorCode::InvalidTarget
        );
        assert_eq!(
            IntakeError::from(NavigationError::NotComplete(topic)).code(),
            ErrorCode::TopicNotComplete
        );
    }

    #[test]
    fn provider_failures_are_flagged() {
        let err = IntakeError::from(EngineError::from(AIError::AuthenticationFailed));
        assert_eq!(err.code(), ErrorCode::AIProviderError);
        let err = IntakeError::from(EngineError::InvalidState("x".into()));
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[test]
    fn render_incomplete_becomes_session_incomplete() {
        let id = SessionId::new();
        let err = IntakeError::from_render(id, RenderError::Incomplete(id.to_string()));
        assert_eq!(err.code(), ErrorCode::SessionIncomplete);
    }
}
