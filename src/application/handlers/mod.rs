//! Application handlers.
//!
//! Command and query handlers that load sessions, run the engine and
//! persist results.

pub mod intake;
pub mod schema;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use intake::{
    ExportSummaryHandler, ExportSummaryQuery, GetSessionHandler, GetSessionQuery, IntakeError,
    NavigateTopicCommand, NavigateTopicHandler, NavigateTopicResult, SendChatCommand,
    SendChatHandler, SendChatResult,
};
pub use schema::{
    ActiveSchemaView, GetActiveSchemaHandler, ListSchemasHandler, SchemaCommandError,
    SchemaListing, SwitchSchemaCommand, SwitchSchemaHandler, SwitchSchemaResult,
};
