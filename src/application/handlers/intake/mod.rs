//! Intake command and query handlers.

mod errors;
mod export_summary;
mod get_session;
mod navigate_topic;
mod send_chat;

pub use errors::IntakeError;
pub use export_summary::{ExportSummaryHandler, ExportSummaryQuery};
pub use get_session::{GetSessionHandler, GetSessionQuery};
pub use navigate_topic::{NavigateTopicCommand, NavigateTopicHandler, NavigateTopicResult};
pub use send_chat::{SendChatCommand, SendChatHandler, SendChatResult};
