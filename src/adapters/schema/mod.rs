//! Schema Adapters
//!
//! - **SchemaCatalog** - Named flow schemas loaded from a directory

mod schema_catalog;

pub use schema_catalog::SchemaCatalog;
