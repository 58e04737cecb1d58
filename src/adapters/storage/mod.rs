//! Storage Adapters
//!
//! Implementations of the SessionStore port.
//!
//! ## Available Adapters
//!
//! - **FileSessionStore** - One JSON file per session on disk
//! - **InMemorySessionStore** - Shared in-process map (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileSessionStore, InMemorySessionStore};
//!
//! let store = FileSessionStore::new("./data/sessions");
//! let store = InMemorySessionStore::new();
//! ```

mod file_session_store;
mod in_memory_session_store;

pub use file_session_store::FileSessionStore;
pub use in_memory_session_store::InMemorySessionStore;
