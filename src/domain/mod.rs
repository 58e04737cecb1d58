//! Domain layer containing the conversation engine and its types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, field values, errors)
//! - `schema` - Flow schema: steps, topics, fields, visibility rules
//! - `session` - Per-session state and per-topic data
//! - `engine` - Topic graph engine, extraction, retry, navigation

pub mod engine;
pub mod foundation;
pub mod schema;
pub mod session;
