//! Application layer - Commands, Queries, and Handlers.
//!
//! Orchestrates the engine and coordinates between ports. Command
//! handlers (chat, navigate, switch schema) write; query handlers read.

pub mod handlers;
mod session_locks;

pub use handlers::{
    ActiveSchemaView, ExportSummaryHandler, ExportSummaryQuery, GetActiveSchemaHandler,
    GetSessionHandler, GetSessionQuery, IntakeError, ListSchemasHandler, NavigateTopicCommand,
    NavigateTopicHandler, NavigateTopicResult, SchemaCommandError, SchemaListing,
    SendChatCommand, SendChatHandler, SendChatResult, SwitchSchemaCommand, SwitchSchemaHandler,
    SwitchSchemaResult,
};
pub use session_locks::{SessionGuard, SessionLocks};
