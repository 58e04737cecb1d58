//! Flow schema types.
//!
//! A flow schema describes the topics of an intake conversation, the
//! fields each topic collects, when conditional topics are shown, and
//! how each topic decides it is complete. Schemas are read-only while
//! sessions run against them.

mod field;
mod flow;
mod rule;
mod topic;

pub use field::{FieldKind, FieldSpec};
pub use flow::{
    DocumentSettings, FlowSchema, PlacedTopic, SessionBehaviour, DEFAULT_COMPLETION_MESSAGE,
};
pub use rule::{RuleOperator, VisibilityRule};
pub use topic::{CompletionMode, StepSchema, TopicPrompts, TopicSchema};
