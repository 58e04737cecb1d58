//! GetActiveSchemaHandler - Query for the schema sessions run against.

use std::sync::Arc;

use crate::domain::schema::FlowSchema;
use crate::ports::SchemaProvider;

#[derive(Debug, Clone)]
pub struct ActiveSchemaView {
    pub name: String,
    pub schema: Arc<FlowSchema>,
}

pub struct GetActiveSchemaHandler {
    schemas: Arc<dyn SchemaProvider>,
}

impl GetActiveSchemaHandler {
    pub fn new(schemas: Arc<dyn SchemaProvider>) -> Self {
        Self { schemas }
    }

    pub async fn handle(&self) -> ActiveSchemaView {
        ActiveSchemaView {
            name: self.schemas.active_name().await,
            schema: self.schemas.active().await,
        }
    }
}
