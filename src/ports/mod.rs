//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Language-model completions
//! - `SessionStore` - Session persistence keyed by session id
//! - `SchemaProvider` - Named flow schema bundles
//! - `SummaryRenderer` - End-of-session document

mod ai_provider;
mod schema_provider;
mod session_store;
mod summary_renderer;

pub use ai_provider::{
    AIError, AIProvider, CallPurpose, CompletionRequest, CompletionResponse, FinishReason,
    Message, MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use schema_provider::{SchemaError, SchemaProvider};
pub use session_store::{SessionStore, SessionStoreError};
pub use summary_renderer::{RenderError, RenderedDocument, SummaryRenderer};
