//! In-Memory Session Store Adapter
//!
//! Keeps sessions in a shared map. Contents are lost on restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::SessionId;
use crate::domain::session::SessionState;
use crate::ports::{SessionStore, SessionStoreError};

/// In-memory storage for session state.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionState>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: SessionId) -> Result<Option<SessionState>, SessionStoreError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn save(&self, state: &SessionState) -> Result<(), SessionStoreError> {
        self.sessions
            .write()
            .await
            .insert(state.session_id, state.clone());
        Ok(())
    }

    async fn exists(&self, id: SessionId) -> Result<bool, SessionStoreError> {
        Ok(self.sessions.read().await.contains_key(&id))
    }

    async fn delete(&self, id: SessionId) -> Result<bool, SessionStoreError> {
        Ok(self.sessions.write().await.remove(&id).is_some())
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        self.sessions.write().await.clear();
        Ok(())
    }
}
