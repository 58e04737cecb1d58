//! Shared wiring for handler tests.

use std::sync::Arc;

use crate::adapters::ai::MockAIProvider;
use crate::adapters::schema::SchemaCatalog;
use crate::adapters::storage::InMemorySessionStore;
use crate::domain::engine::{EngineSettings, TopicGraphEngine};
use crate::domain::schema::FlowSchema;

pub(crate) const GREETING: &str = "Welcome! Let's get started.";

/// Two flat topics: `idea` (required text field) then `owner`.
pub(crate) fn intake_schema() -> FlowSchema {
    serde_json::from_str(&format!(
        r#"{{"name":"intake","title":"Intake","greeting":"{}",
            "topics":[
              {{"id":"idea","title":"Idea","intro":"What is your idea?",
                "fields":[{{"key":"idea","label":"Idea","required":true}}]}},
              {{"id":"owner","title":"Owner","intro":"Who owns it?",
                "fields":[{{"key":"owner","label":"Owner","required":true}}]}}
            ]}}"#,
        GREETING
    ))
    .unwrap()
}

pub(crate) fn review_schema() -> FlowSchema {
    serde_json::from_str(
        r#"{"name":"review","title":"Review","topics":[
            {"id":"summary","title":"Summary","intro":"Summarise the quarter."}]}"#,
    )
    .unwrap()
}

pub(crate) struct Fixture {
    pub provider: MockAIProvider,
    pub store: Arc<InMemorySessionStore>,
    pub catalog: Arc<SchemaCatalog>,
    pub engine: Arc<TopicGraphEngine>,
}

pub(crate) fn fixture() -> Fixture {
    fixture_with(MockAIProvider::new())
}

pub(crate) fn fixture_with(provider: MockAIProvider) -> Fixture {
    let catalog = SchemaCatalog::from_schemas(
        vec![
            ("intake".to_string(), intake_schema()),
            ("review".to_string(), review_schema()),
        ],
        Some("intake"),
    )
    .unwrap();
    Fixture {
        engine: Arc::new(TopicGraphEngine::new(
            Arc::new(provider.clone()),
            EngineSettings::default(),
        )),
        provider,
        store: Arc::new(InMemorySessionStore::new()),
        catalog: Arc::new(catalog),
    }
}
