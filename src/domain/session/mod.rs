//! Session domain module.
//!
//! Holds the mutable state of an intake: which topic is active, each
//! topic's transcript, collected fields and status, and the revisit
//! bookkeeping surfaced to callers.

mod state;
mod topic_data;

pub use state::SessionState;
pub use topic_data::{
    InvalidStatusTransition, Role, TopicData, TopicScore, TopicStatus, TranscriptMessage,
};
