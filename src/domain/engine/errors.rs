//! Engine errors.

use thiserror::Error;

use crate::domain::foundation::{StepId, TopicId};
use crate::domain::session::InvalidStatusTransition;
use crate::ports::AIError;

/// Failures while processing a message.
///
/// Malformed model output never appears here; it is retried and replaced
/// by a fallback inside the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Session references a topic the schema does not declare.
    #[error("topic not found in schema: {0}")]
    UnknownTopic(TopicId),

    #[error("invalid session state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Status(#[from] InvalidStatusTransition),

    /// Non-retryable model provider failure.
    #[error("AI provider error: {0}")]
    Provider(#[from] AIError),
}

/// Failures of an explicit revisit request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("unknown topic: {0}")]
    UnknownTopic(TopicId),

    #[error("unknown step: {0}")]
    UnknownStep(StepId),

    #[error("topic {topic} is not part of step {step}")]
    TopicNotInStep { topic: TopicId, step: StepId },

    /// Only completed topics can be revisited.
    #[error("topic {0} is not complete")]
    NotComplete(TopicId),
}

impl NavigationError {
    /// True for the "bad target id" family.
    pub fn is_invalid_target(&self) -> bool {
        !matches!(self, NavigationError::NotComplete(_))
    }
}
