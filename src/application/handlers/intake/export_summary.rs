//! ExportSummaryHandler - Renders the summary document of a finished session.

use std::sync::Arc;

use super::IntakeError;
use crate::domain::foundation::SessionId;
use crate::ports::{RenderedDocument, SchemaProvider, SessionStore, SummaryRenderer};

#[derive(Debug, Clone, Copy)]
pub struct ExportSummaryQuery {
    pub session_id: SessionId,
}

pub struct ExportSummaryHandler {
    store: Arc<dyn SessionStore>,
    schemas: Arc<dyn SchemaProvider>,
    renderer: Arc<dyn SummaryRenderer>,
}

impl ExportSummaryHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        schemas: Arc<dyn SchemaProvider>,
        renderer: Arc<dyn SummaryRenderer>,
    ) -> Self {
        Self {
            store,
            schemas,
            renderer,
        }
    }

    pub async fn handle(&self, query: ExportSummaryQuery) -> Result<RenderedDocument, IntakeError> {
        let schema = self.schemas.active().await;
        let state = self
            .store
            .get(query.session_id)
            .await?
            .filter(|state| state.matches_schema(&schema))
            .ok_or(IntakeError::SessionNotFound(query.session_id))?;

        let document = self
            .renderer
            .render(&schema, &state)
            .map_err(|e| IntakeError::from_render(query.session_id, e))?;

        tracing::info!(
            session_id = %query.session_id,
            file_name = %document.file_name,
            "summary exported"
        );
        Ok(document)
    }
}
