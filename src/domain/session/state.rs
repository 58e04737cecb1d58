//! Session state - everything the engine knows about one intake.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::topic_data::TopicData;
use crate::domain::foundation::{SessionId, StepId, TopicId, ValidationError};
use crate::domain::schema::FlowSchema;

/// Complete, serializable state of an intake session.
///
/// Persisted as-is; contains no derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_step_id: Option<StepId>,
    pub active_topic_id: TopicId,
    pub topics: BTreeMap<TopicId, TopicData>,
    pub done: bool,
    #[serde(default)]
    pub revisiting_topic_id: Option<TopicId>,
    #[serde(default)]
    pub resume_topic_id: Option<TopicId>,
}

impl SessionState {
    /// Creates a fresh session with every topic `NotStarted` and the first
    /// topic of the schema active.
    pub fn start(schema: &FlowSchema) -> Result<Self, ValidationError> {
        let first = schema
            .first_topic()
            .ok_or_else(|| ValidationError::empty_field("topics"))?;

        let topics = schema
            .ordered_topics()
            .into_iter()
            .map(|p| (p.topic.id.clone(), TopicData::default()))
            .collect();

        Ok(Self {
            session_id: SessionId::new(),
            active_step_id: first.step_id().cloned(),
            active_topic_id: first.topic.id.clone(),
            topics,
            done: false,
            revisiting_topic_id: None,
            resume_topic_id: None,
        })
    }

    pub fn topic(&self, topic_id: &TopicId) -> Option<&TopicData> {
        self.topics.get(topic_id)
    }

    pub fn topic_mut(&mut self, topic_id: &TopicId) -> Option<&mut TopicData> {
        self.topics.get_mut(topic_id)
    }

    pub fn active_topic(&self) -> Option<&TopicData> {
        self.topics.get(&self.active_topic_id)
    }

    pub fn active_topic_mut(&mut self) -> Option<&mut TopicData> {
        self.topics.get_mut(&self.active_topic_id)
    }

    /// True when the active topic has no transcript yet.
    pub fn needs_bootstrap(&self) -> bool {
        self.active_topic()
            .map(|t| t.transcript.is_empty())
            .unwrap_or(true)
    }

    /// True when this state was started under `schema`: the active topic
    /// exists there and both sides hold the same set of topics.
    pub fn matches_schema(&self, schema: &FlowSchema) -> bool {
        let ordered = schema.ordered_topics();
        schema.placed(&self.active_topic_id).is_some()
            && ordered.len() == self.topics.len()
            && ordered.iter().all(|p| self.topics.contains_key(&p.topic.id))
    }
}
