//! Conversation orchestration engine.
//!
//! - `visibility` - which topics are shown given collected values
//! - `extractor` - transcript to typed field values
//! - `retry` - bounded retry and fallback around model output
//! - `completion` - required-fields and scored completion strategies
//! - `transition` - pure next-step decision
//! - `topic_graph` - processes one message end to end
//! - `navigation` - explicit revisit of completed topics

mod completion;
mod errors;
mod extractor;
mod json;
mod model;
mod navigation;
mod retry;
mod topic_graph;
mod transition;
mod visibility;

pub use completion::{
    CompletionStrategy, RequiredFieldsStrategy, ScoredDialogueStrategy, TurnContext,
};
pub use errors::{EngineError, NavigationError};
pub use extractor::{
    build_extraction_prompt, check_completion, coerce_extracted, missing_required, FieldExtractor,
};
pub use json::{extract_json_object, JsonExtractError};
pub use model::ModelClient;
pub use navigation::{
    navigate, revisit_acknowledgement, Navigated, NavigationKind, ALREADY_ACTIVE_MESSAGE,
};
pub use retry::{
    call_scored, call_text, parse_scored, retry, scored_fallback, AttemptError, RetryError,
    ScoredCall, FALLBACK_MISSING, FALLBACK_VALUE,
};
pub use topic_graph::{
    EngineSettings, ProcessOutcome, TopicGraphEngine, DEFAULT_LLM_TIMEOUT,
    DEFAULT_MALFORMED_JSON_RETRIES, DEFAULT_TRANSCRIPT_WINDOW,
};
pub use transition::{decide, Transition};
pub use visibility::{
    all_visible_complete, evaluate, first_visible_incomplete, is_visible,
    next_visible_incomplete, visible_topics,
};
