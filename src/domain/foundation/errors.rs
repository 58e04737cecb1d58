//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object and schema construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Duplicate {kind} '{id}'")]
    Duplicate { kind: String, id: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a duplicate identifier error.
    pub fn duplicate(kind: impl Into<String>, id: impl Into<String>) -> Self {
        ValidationError::Duplicate {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

/// Machine-readable error codes surfaced to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,

    // Not found errors
    SessionNotFound,
    SchemaNotFound,

    // State errors
    InvalidTarget,
    TopicNotComplete,
    SessionIncomplete,

    // AI errors
    AIProviderError,

    // Infrastructure errors
    StorageError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::SessionNotFound => "SESSION_NOT_FOUND",
            ErrorCode::SchemaNotFound => "SCHEMA_NOT_FOUND",
            ErrorCode::InvalidTarget => "INVALID_TARGET",
            ErrorCode::TopicNotComplete => "NOT_COMPLETE",
            ErrorCode::SessionIncomplete => "SESSION_INCOMPLETE",
            ErrorCode::AIProviderError => "AI_PROVIDER_ERROR",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("topic_id");
        assert_eq!(format!("{}", err), "Field 'topic_id' cannot be empty");
    }

    #[test]
    fn validation_error_out_of_range_displays_correctly() {
        let err = ValidationError::out_of_range("min_confidence", 0.0, 1.0, 1.5);
        assert_eq!(
            format!("{}", err),
            "Field 'min_confidence' must be between 0 and 1, got 1.5"
        );
    }

    #[test]
    fn validation_error_duplicate_displays_correctly() {
        let err = ValidationError::duplicate("topic", "goals");
        assert_eq!(format!("{}", err), "Duplicate topic 'goals'");
    }

    #[test]
    fn error_code_display_formats_correctly() {
        assert_eq!(format!("{}", ErrorCode::SessionNotFound), "SESSION_NOT_FOUND");
        assert_eq!(format!("{}", ErrorCode::TopicNotComplete), "NOT_COMPLETE");
        assert_eq!(format!("{}", ErrorCode::InternalError), "INTERNAL_ERROR");
    }
}
