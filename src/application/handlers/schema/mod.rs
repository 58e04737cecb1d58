//! Schema catalog handlers.

mod errors;
mod get_active_schema;
mod list_schemas;
mod switch_schema;

pub use errors::SchemaCommandError;
pub use get_active_schema::{ActiveSchemaView, GetActiveSchemaHandler};
pub use list_schemas::{ListSchemasHandler, SchemaListing};
pub use switch_schema::{SwitchSchemaCommand, SwitchSchemaHandler, SwitchSchemaResult};
