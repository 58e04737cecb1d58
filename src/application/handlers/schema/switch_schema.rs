//! SwitchSchemaHandler - Changes the active schema and drops every session.

use std::sync::Arc;

use super::SchemaCommandError;
use crate::application::SessionLocks;
use crate::domain::schema::FlowSchema;
use crate::ports::{SchemaProvider, SessionStore};

#[derive(Debug, Clone)]
pub struct SwitchSchemaCommand {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct SwitchSchemaResult {
    pub current: String,
    pub schema: Arc<FlowSchema>,
}

pub struct SwitchSchemaHandler {
    schemas: Arc<dyn SchemaProvider>,
    store: Arc<dyn SessionStore>,
    locks: SessionLocks,
}

impl SwitchSchemaHandler {
    pub fn new(
        schemas: Arc<dyn SchemaProvider>,
        store: Arc<dyn SessionStore>,
        locks: SessionLocks,
    ) -> Self {
        Self {
            schemas,
            store,
            locks,
        }
    }

    /// Sessions started under another schema reference topics that may
    /// not exist any more, so the store is cleared on every switch.
    /// In-flight chat and navigation requests finish before the switch
    /// and new ones wait until the store is cleared.
    pub async fn handle(
        &self,
        cmd: SwitchSchemaCommand,
    ) -> Result<SwitchSchemaResult, SchemaCommandError> {
        let name = cmd.name.trim();
        if name.is_empty() {
            return Err(SchemaCommandError::MissingName);
        }

        let _all = self.locks.acquire_all().await;
        let schema = self.schemas.switch(name).await?;
        self.store.clear().await?;
        tracing::info!(schema = %name, "sessions cleared after schema switch");

        Ok(SwitchSchemaResult {
            current: name.to_string(),
            schema,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_fixtures::fixture;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::session::SessionState;
    use crate::ports::SchemaError;

    #[tokio::test]
    async fn switch_clears_sessions() {
        let f = fixture();
        let state = SessionState::start(&*f.catalog.active().await).unwrap();
        f.store.save(&state).await.unwrap();

        let handler =
            SwitchSchemaHandler::new(f.catalog.clone(), f.store.clone(), SessionLocks::new());
        let result = handler
            .handle(SwitchSchemaCommand {
                name: "review".into(),
            })
            .await
            .unwrap();

        assert_eq!(result.current, "review");
        assert_eq!(result.schema.title, "Review");
        assert_eq!(f.store.session_count().await, 0);
        assert_eq!(f.catalog.active_name().await, "review");
    }

    #[tokio::test]
    async fn rejects_blank_and_unknown_names() {
        let f = fixture();
        let state = SessionState::start(&*f.catalog.active().await).unwrap();
        f.store.save(&state).await.unwrap();
        let handler =
            SwitchSchemaHandler::new(f.catalog.clone(), f.store.clone(), SessionLocks::new());

        let err = handler
            .handle(SwitchSchemaCommand { name: "  ".into() })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);

        let err = handler
            .handle(SwitchSchemaCommand {
                name: "nope".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SchemaCommandError::Schema(SchemaError::NotFound(_))));
        assert_eq!(err.code(), ErrorCode::SchemaNotFound);
        assert_eq!(f.store.session_count().await, 1);
    }
}
