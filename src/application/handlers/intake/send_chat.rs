//! SendChatHandler - Runs one chat message through the topic graph.

use std::sync::Arc;

use super::IntakeError;
use crate::application::SessionLocks;
use crate::domain::engine::{TopicGraphEngine, Transition};
use crate::domain::foundation::SessionId;
use crate::domain::session::SessionState;
use crate::ports::{SchemaProvider, SessionStore};

/// Command to post a chat message.
///
/// A missing or unknown `session_id` starts a new session. So does one
/// whose stored state belongs to a schema that is no longer active.
#[derive(Debug, Clone, Default)]
pub struct SendChatCommand {
    pub session_id: Option<SessionId>,
    pub message: Option<String>,
}

/// Result of a chat turn.
#[derive(Debug, Clone)]
pub struct SendChatResult {
    pub session_id: SessionId,
    pub reply: String,
    pub state: SessionState,
    pub transition: Option<Transition>,
}

/// Handler for chat messages.
pub struct SendChatHandler {
    store: Arc<dyn SessionStore>,
    schemas: Arc<dyn SchemaProvider>,
    engine: Arc<TopicGraphEngine>,
    locks: SessionLocks,
}

impl SendChatHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        schemas: Arc<dyn SchemaProvider>,
        engine: Arc<TopicGraphEngine>,
        locks: SessionLocks,
    ) -> Self {
        Self {
            store,
            schemas,
            engine,
            locks,
        }
    }

    pub async fn handle(&self, cmd: SendChatCommand) -> Result<SendChatResult, IntakeError> {
        let lock_id = cmd.session_id.unwrap_or_default();
        let _guard = self.locks.acquire(lock_id).await;

        let schema = self.schemas.active().await;

        let existing = match cmd.session_id {
            Some(id) => match self.store.get(id).await? {
                Some(state) if !state.matches_schema(&schema) => {
                    tracing::warn!(
                        session_id = %id,
                        schema = %schema.name,
                        "discarding session from another schema"
                    );
                    self.store.delete(id).await?;
                    None
                }
                other => other,
            },
            None => None,
        };

        let outcome = match existing {
            None => {
                let state = SessionState::start(&schema)?;
                tracing::info!(session_id = %state.session_id, schema = %schema.name, "session created");
                let mut outcome = self.engine.bootstrap(&schema, state)?;
                if let Some(greeting) = schema.greeting.as_deref().filter(|g| !g.trim().is_empty()) {
                    outcome.reply = format!("{}\n\n{}", greeting, outcome.reply);
                }
                outcome
            }
            Some(state) if state.needs_bootstrap() => self.engine.bootstrap(&schema, state)?,
            Some(state) => {
                self.engine
                    .process(&schema, state, cmd.message.as_deref())
                    .await?
            }
        };

        // Persist only after a successful cycle.
        self.store.save(&outcome.state).await?;

        Ok(SendChatResult {
            session_id: outcome.state.session_id,
            reply: outcome.reply,
            state: outcome.state,
            transition: outcome.transition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockError;
    use std::time::Duration;

    use crate::adapters::ai::MockAIProvider;
    use crate::application::handlers::test_fixtures::{
        fixture, fixture_with, review_schema, Fixture, GREETING,
    };
    use crate::application::{SwitchSchemaCommand, SwitchSchemaHandler};
    use crate::domain::engine::EngineError;
    use crate::domain::foundation::{ErrorCode, FieldValue, TopicId};
    use crate::domain::session::TopicStatus;
    use crate::ports::CallPurpose;

    fn handler(f: &Fixture) -> SendChatHandler {
        SendChatHandler::new(
            f.store.clone(),
            f.catalog.clone(),
            f.engine.clone(),
            SessionLocks::new(),
        )
    }

    #[tokio::test]
    async fn new_session_is_bootstrapped_with_greeting() {
        let f = fixture();
        let result = handler(&f)
            .handle(SendChatCommand {
                session_id: None,
                message: Some("ignored".into()),
            })
            .await
            .unwrap();

        assert_eq!(result.reply, format!("{}\n\nWhat is your idea?", GREETING));
        assert_eq!(f.provider.call_count(), 0);
        let idea = result.state.topic(&TopicId::new("idea").unwrap()).unwrap();
        assert_eq!(idea.status, TopicStatus::InProgress);
        assert!(f.store.exists(result.session_id).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_session_id_starts_fresh_session() {
        let f = fixture();
        let unknown = SessionId::new();
        let result = handler(&f)
            .handle(SendChatCommand {
                session_id: Some(unknown),
                message: None,
            })
            .await
            .unwrap();
        assert_ne!(result.session_id, unknown);
        assert!(result.reply.starts_with(GREETING));
    }

    #[tokio::test]
    async fn session_from_another_schema_starts_fresh() {
        let f = fixture();
        let stale = SessionState::start(&review_schema()).unwrap();
        f.store.save(&stale).await.unwrap();

        let result = handler(&f)
            .handle(SendChatCommand {
                session_id: Some(stale.session_id),
                message: Some("hello".into()),
            })
            .await
            .unwrap();

        assert_ne!(result.session_id, stale.session_id);
        assert_eq!(result.reply, format!("{}\n\nWhat is your idea?", GREETING));
        assert!(!f.store.exists(stale.session_id).await.unwrap());
        assert_eq!(f.provider.call_count(), 0);
    }

    #[tokio::test]
    async fn schema_switch_waits_for_running_chat() {
        let f = fixture_with(MockAIProvider::new().with_delay(Duration::from_millis(200)));
        let locks = SessionLocks::new();
        let chat = Arc::new(SendChatHandler::new(
            f.store.clone(),
            f.catalog.clone(),
            f.engine.clone(),
            locks.clone(),
        ));
        let switch = SwitchSchemaHandler::new(f.catalog.clone(), f.store.clone(), locks);

        let first = chat.handle(SendChatCommand::default()).await.unwrap();
        let session_id = first.session_id;

        f.provider
            .enqueue_for(CallPurpose::Extraction, r#"{"idea":"Community garden"}"#);
        let running = {
            let chat = Arc::clone(&chat);
            tokio::spawn(async move {
                chat.handle(SendChatCommand {
                    session_id: Some(session_id),
                    message: Some("A community garden".into()),
                })
                .await
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        switch
            .handle(SwitchSchemaCommand {
                name: "review".into(),
            })
            .await
            .unwrap();

        assert!(running.await.unwrap().is_ok());
        assert_eq!(f.store.session_count().await, 0);

        let next = chat
            .handle(SendChatCommand {
                session_id: Some(session_id),
                message: Some("hello".into()),
            })
            .await
            .unwrap();
        assert_ne!(next.session_id, session_id);
        assert_eq!(next.reply, "Summarise the quarter.");
        assert_eq!(next.state.active_topic_id, TopicId::new("summary").unwrap());
    }

    #[tokio::test]
    async fn message_advances_to_next_topic() {
        let f = fixture();
        let h = handler(&f);
        let first = h.handle(SendChatCommand::default()).await.unwrap();

        f.provider
            .enqueue_for(CallPurpose::Extraction, r#"{"idea":"Community garden"}"#);
        let second = h
            .handle(SendChatCommand {
                session_id: Some(first.session_id),
                message: Some("A community garden".into()),
            })
            .await
            .unwrap();

        assert_eq!(second.session_id, first.session_id);
        assert_eq!(second.state.active_topic_id, TopicId::new("owner").unwrap());
        assert!(second.reply.ends_with("Who owns it?"));
        assert_eq!(
            second.transition,
            Some(Transition::AdvanceTopic {
                topic: TopicId::new("owner").unwrap()
            })
        );
        let stored = f.store.get(first.session_id).await.unwrap().unwrap();
        assert_eq!(
            stored.topic(&TopicId::new("idea").unwrap()).unwrap().field("idea"),
            Some(&FieldValue::text("Community garden"))
        );
    }

    #[tokio::test]
    async fn fatal_provider_error_leaves_store_untouched() {
        let f = fixture();
        let h = handler(&f);
        let first = h.handle(SendChatCommand::default()).await.unwrap();
        let before = f.store.get(first.session_id).await.unwrap();

        f.provider.enqueue_for(CallPurpose::Extraction, "{}");
        f.provider
            .enqueue_error_for(CallPurpose::Reply, MockError::AuthenticationFailed);
        let err = h
            .handle(SendChatCommand {
                session_id: Some(first.session_id),
                message: Some("hello".into()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, IntakeError::Engine(EngineError::Provider(_))));
        assert_eq!(err.code(), ErrorCode::AIProviderError);
        assert_eq!(f.store.get(first.session_id).await.unwrap(), before);
    }
}
