//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Model providers (OpenAI, Anthropic, mock)
//! - `document` - Markdown summary rendering
//! - `http` - axum routes and DTOs
//! - `schema` - Schema bundles loaded from disk
//! - `storage` - Session stores (in-memory, JSON files)

pub mod ai;
pub mod document;
pub mod http;
pub mod schema;
pub mod storage;
