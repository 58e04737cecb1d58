//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid socket address: {0}")]
    InvalidAddress(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Request timeout must not be shorter than the model call timeout")]
    RequestTimeoutTooShort,

    #[error("Invalid model call timeout")]
    InvalidLlmTimeout,

    #[error("Transcript window must be at least 1")]
    InvalidTranscriptWindow,

    #[error("Malformed JSON retries must be at most 10")]
    TooManyRetries,
}
