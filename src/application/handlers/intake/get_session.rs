//! GetSessionHandler - Query handler for a stored session.

use std::sync::Arc;

use super::IntakeError;
use crate::domain::foundation::SessionId;
use crate::domain::session::SessionState;
use crate::ports::SessionStore;

/// Query to get a session by ID.
#[derive(Debug, Clone, Copy)]
pub struct GetSessionQuery {
    pub session_id: SessionId,
}

pub struct GetSessionHandler {
    store: Arc<dyn SessionStore>,
}

impl GetSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetSessionQuery) -> Result<SessionState, IntakeError> {
        self.store
            .get(query.session_id)
            .await?
            .ok_or(IntakeError::SessionNotFound(query.session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::application::handlers::test_fixtures::intake_schema;

    #[tokio::test]
    async fn returns_stored_session() {
        let store = Arc::new(InMemorySessionStore::new());
        let state = SessionState::start(&intake_schema()).unwrap();
        store.save(&state).await.unwrap();

        let handler = GetSessionHandler::new(store);
        let found = handler
            .handle(GetSessionQuery {
                session_id: state.session_id,
            })
            .await
            .unwrap();
        assert_eq!(found, state);
    }

    #[tokio::test]
    async fn returns_not_found_for_unknown_id() {
        let handler = GetSessionHandler::new(Arc::new(InMemorySessionStore::new()));
        let err = handler
            .handle(GetSessionQuery {
                session_id: SessionId::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::SessionNotFound(_)));
    }
}
