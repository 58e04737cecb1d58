//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, field values and error types that form the
//! vocabulary of the intake domain.

mod errors;
mod field_value;
mod ids;

pub use errors::{ErrorCode, ValidationError};
pub use field_value::{FieldMap, FieldValue};
pub use ids::{SessionId, StepId, TopicId};
