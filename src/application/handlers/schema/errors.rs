//! Errors surfaced by the schema catalog handlers.

use thiserror::Error;

use crate::domain::foundation::ErrorCode;
use crate::ports::{SchemaError, SessionStoreError};

#[derive(Debug, Error)]
pub enum SchemaCommandError {
    #[error("config name is required")]
    MissingName,

    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Schema switched but the session store could not be cleared.
    #[error(transparent)]
    Storage(#[from] SessionStoreError),
}

impl SchemaCommandError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SchemaCommandError::MissingName => ErrorCode::ValidationFailed,
            SchemaCommandError::Schema(SchemaError::NotFound(_)) => ErrorCode::SchemaNotFound,
            SchemaCommandError::Schema(_) => ErrorCode::InternalError,
            SchemaCommandError::Storage(_) => ErrorCode::StorageError,
        }
    }
}
