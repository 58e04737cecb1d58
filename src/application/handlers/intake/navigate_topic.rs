//! NavigateTopicHandler - Reopens a completed topic for editing.

use std::sync::Arc;

use super::IntakeError;
use crate::application::SessionLocks;
use crate::domain::engine::{navigate, NavigationKind};
use crate::domain::foundation::{SessionId, StepId, TopicId};
use crate::domain::session::SessionState;
use crate::ports::{SchemaProvider, SessionStore};

/// Command to navigate to a topic.
///
/// Ids arrive as raw strings; malformed ones are reported as an invalid
/// target after the session itself is found.
#[derive(Debug, Clone)]
pub struct NavigateTopicCommand {
    pub session_id: SessionId,
    pub topic_id: String,
    pub step_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NavigateTopicResult {
    pub state: SessionState,
    pub message: String,
    pub kind: NavigationKind,
}

pub struct NavigateTopicHandler {
    store: Arc<dyn SessionStore>,
    schemas: Arc<dyn SchemaProvider>,
    locks: SessionLocks,
}

impl NavigateTopicHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        schemas: Arc<dyn SchemaProvider>,
        locks: SessionLocks,
    ) -> Self {
        Self {
            store,
            schemas,
            locks,
        }
    }

    pub async fn handle(
        &self,
        cmd: NavigateTopicCommand,
    ) -> Result<NavigateTopicResult, IntakeError> {
        let _guard = self.locks.acquire(cmd.session_id).await;

        let schema = self.schemas.active().await;
        let state = self
            .store
            .get(cmd.session_id)
            .await?
            .filter(|state| state.matches_schema(&schema))
            .ok_or(IntakeError::SessionNotFound(cmd.session_id))?;

        let topic_id = TopicId::new(cmd.topic_id.as_str())
            .map_err(|_| IntakeError::InvalidTarget(cmd.topic_id.clone()))?;
        let step_id = cmd
            .step_id
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| StepId::new(s).map_err(|_| IntakeError::InvalidTarget(s.to_string())))
            .transpose()?;

        let navigated = navigate(&schema, state, &topic_id, step_id.as_ref())?;

        if navigated.kind == NavigationKind::Revisit {
            self.store.save(&navigated.state).await?;
        }

        Ok(NavigateTopicResult {
            state: navigated.state,
            message: navigated.message,
            kind: navigated.kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_fixtures::{fixture, Fixture};
    use crate::domain::engine::ALREADY_ACTIVE_MESSAGE;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::session::TopicStatus;

    fn handler(f: &Fixture) -> NavigateTopicHandler {
        NavigateTopicHandler::new(f.store.clone(), f.catalog.clone(), SessionLocks::new())
    }

    fn cmd(session_id: SessionId, topic: &str) -> NavigateTopicCommand {
        NavigateTopicCommand {
            session_id,
            topic_id: topic.to_string(),
            step_id: None,
        }
    }

    /// `idea` complete, `owner` active.
    async fn seeded(f: &Fixture) -> SessionState {
        let schema = f.catalog.active().await;
        let mut state = SessionState::start(&schema).unwrap();
        let idea = state.topic_mut(&TopicId::new("idea").unwrap()).unwrap();
        idea.begin();
        idea.push_assistant("What is your idea?");
        idea.status = TopicStatus::Complete;
        state.active_topic_id = TopicId::new("owner").unwrap();
        state.active_topic_mut().unwrap().begin();
        f.store.save(&state).await.unwrap();
        state
    }

    #[tokio::test]
    async fn revisit_is_persisted() {
        let f = fixture();
        let state = seeded(&f).await;

        let result = handler(&f).handle(cmd(state.session_id, "idea")).await.unwrap();

        assert_eq!(result.kind, NavigationKind::Revisit);
        let stored = f.store.get(state.session_id).await.unwrap().unwrap();
        assert_eq!(stored.active_topic_id, TopicId::new("idea").unwrap());
        assert_eq!(stored.resume_topic_id, Some(TopicId::new("owner").unwrap()));
    }

    #[tokio::test]
    async fn already_active_is_not_saved_again() {
        let f = fixture();
        let state = seeded(&f).await;
        let result = handler(&f).handle(cmd(state.session_id, "owner")).await.unwrap();
        assert_eq!(result.message, ALREADY_ACTIVE_MESSAGE);
        assert_eq!(result.state, state);
    }

    #[tokio::test]
    async fn error_codes() {
        let f = fixture();
        let state = seeded(&f).await;
        let h = handler(&f);

        let err = h.handle(cmd(SessionId::new(), "idea")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::SessionNotFound);

        let err = h.handle(cmd(state.session_id, "missing")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidTarget);

        let err = h.handle(cmd(state.session_id, "")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidTarget);

        // `owner` is still open once `idea` is reopened.
        let nav = h.handle(cmd(state.session_id, "idea")).await.unwrap();
        assert_eq!(nav.kind, NavigationKind::Revisit);
        let err = h.handle(cmd(state.session_id, "owner")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::TopicNotComplete);
        assert_eq!(
            f.store.get(state.session_id).await.unwrap().unwrap(),
            nav.state
        );
    }
}
