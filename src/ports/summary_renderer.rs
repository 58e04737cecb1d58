//! Summary Renderer Port - Interface for the end-of-session document.

use thiserror::Error;

use crate::domain::schema::FlowSchema;
use crate::domain::session::SessionState;

/// A rendered document ready to be sent as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}

/// Errors that can occur while rendering.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("session {0} is not complete")]
    Incomplete(String),

    #[error("rendering failed: {0}")]
    Failed(String),
}

/// Port for turning a finished session into a document.
pub trait SummaryRenderer: Send + Sync {
    /// Renders the visible topics of `state` with their collected values.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Incomplete` when `state.done` is false.
    fn render(
        &self,
        schema: &FlowSchema,
        state: &SessionState,
    ) -> Result<RenderedDocument, RenderError>;
}
