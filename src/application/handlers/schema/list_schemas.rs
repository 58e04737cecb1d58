//! ListSchemasHandler - Names of every available schema.

use std::sync::Arc;

use crate::ports::SchemaProvider;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaListing {
    pub configs: Vec<String>,
    pub current: String,
}

pub struct ListSchemasHandler {
    schemas: Arc<dyn SchemaProvider>,
}

impl ListSchemasHandler {
    pub fn new(schemas: Arc<dyn SchemaProvider>) -> Self {
        Self { schemas }
    }

    pub async fn handle(&self) -> SchemaListing {
        SchemaListing {
            configs: self.schemas.list().await,
            current: self.schemas.active_name().await,
        }
    }
}
