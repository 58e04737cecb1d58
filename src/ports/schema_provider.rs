//! Schema Provider Port - Interface for flow schema bundles.
//!
//! Several named schemas may be available; exactly one is active at a
//! time. Sessions always run against the active schema.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::ValidationError;
use crate::domain::schema::FlowSchema;

/// Errors raised while loading or selecting schemas.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("schema not found: {0}")]
    NotFound(String),

    #[error("no schemas available")]
    Empty,

    #[error("invalid schema '{name}': {source}")]
    Invalid {
        name: String,
        #[source]
        source: ValidationError,
    },

    #[error("failed to parse schema '{name}': {message}")]
    Parse { name: String, message: String },

    #[error("IO error: {0}")]
    Io(String),
}

/// Port for reading and switching the active flow schema.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// The schema sessions currently run against.
    async fn active(&self) -> Arc<FlowSchema>;

    /// Name of the active schema.
    async fn active_name(&self) -> String;

    /// Names of every available schema, sorted.
    async fn list(&self) -> Vec<String>;

    /// Makes `name` the active schema and returns it.
    async fn switch(&self, name: &str) -> Result<Arc<FlowSchema>, SchemaError>;
}
