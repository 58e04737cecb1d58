//! Session Store Port - Interface for persisting session state.
//!
//! The engine never holds sessions itself; handlers load a session,
//! hand an owned copy to the engine and save the result.

use async_trait::async_trait;

use crate::domain::foundation::SessionId;
use crate::domain::session::SessionState;

/// Errors that can occur during session storage operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session not found: {0}")]
    NotFound(SessionId),

    #[error("failed to serialize session: {0}")]
    SerializationFailed(String),

    #[error("failed to deserialize session: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Port for storing session state keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads a session, `None` when absent.
    async fn get(&self, id: SessionId) -> Result<Option<SessionState>, SessionStoreError>;

    /// Inserts or replaces the session under its own id.
    async fn save(&self, state: &SessionState) -> Result<(), SessionStoreError>;

    async fn exists(&self, id: SessionId) -> Result<bool, SessionStoreError>;

    /// Removes a session. Returns whether it existed.
    async fn delete(&self, id: SessionId) -> Result<bool, SessionStoreError>;

    /// Removes every session.
    async fn clear(&self) -> Result<(), SessionStoreError>;
}
