//! Flow schema - the full, ordered topic layout of one intake.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::field::FieldKind;
use super::topic::{CompletionMode, StepSchema, TopicSchema};
use crate::domain::foundation::{StepId, TopicId, ValidationError};

/// Default message posted when every visible topic is complete.
pub const DEFAULT_COMPLETION_MESSAGE: &str =
    "Great! We've covered all the topics. You can now download your session summary.";

/// Immutable description of an intake conversation.
///
/// Topics are either flat (`topics`) or grouped under `steps`; exactly
/// one of the two lists is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSchema {
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
    #[serde(default = "default_completion_message")]
    pub completion_message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<TopicSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepSchema>,
    #[serde(default)]
    pub behaviour: SessionBehaviour,
    #[serde(default)]
    pub document: DocumentSettings,
}

/// Schema-wide conversation tuning; unset values fall back to engine defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionBehaviour {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_window: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub malformed_json_retries: Option<u32>,
}

/// Summary document settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            title: None,
            file_name: default_file_name(),
        }
    }
}

fn default_completion_message() -> String {
    DEFAULT_COMPLETION_MESSAGE.to_string()
}

fn default_file_name() -> String {
    "summary.docx".to_string()
}

/// A topic together with its position in the global order.
#[derive(Debug, Clone, Copy)]
pub struct PlacedTopic<'a> {
    pub step: Option<&'a StepSchema>,
    pub topic: &'a TopicSchema,
}

impl<'a> PlacedTopic<'a> {
    pub fn step_id(&self) -> Option<&'a StepId> {
        self.step.map(|s| &s.id)
    }
}

impl FlowSchema {
    /// Every topic in global order, annotated with its step.
    pub fn ordered_topics(&self) -> Vec<PlacedTopic<'_>> {
        if self.steps.is_empty() {
            self.topics
                .iter()
                .map(|topic| PlacedTopic { step: None, topic })
                .collect()
        } else {
            self.steps
                .iter()
                .flat_map(|step| {
                    step.topics.iter().map(move |topic| PlacedTopic {
                        step: Some(step),
                        topic,
                    })
                })
                .collect()
        }
    }

    /// True when topics are grouped under steps.
    pub fn uses_steps(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Looks up a topic with its step.
    pub fn placed(&self, topic_id: &TopicId) -> Option<PlacedTopic<'_>> {
        self.ordered_topics()
            .into_iter()
            .find(|p| &p.topic.id == topic_id)
    }

    /// Looks up a topic by id.
    pub fn topic(&self, topic_id: &TopicId) -> Option<&TopicSchema> {
        self.placed(topic_id).map(|p| p.topic)
    }

    /// Looks up a step by id.
    pub fn step(&self, step_id: &StepId) -> Option<&StepSchema> {
        self.steps.iter().find(|s| &s.id == step_id)
    }

    /// The first topic in global order.
    pub fn first_topic(&self) -> Option<PlacedTopic<'_>> {
        self.ordered_topics().into_iter().next()
    }

    /// Transcript window for a topic (topic override, then schema).
    pub fn transcript_window_for(&self, topic: &TopicSchema) -> Option<usize> {
        topic.transcript_window.or(self.behaviour.transcript_window)
    }

    /// Malformed-JSON retry bound for a topic (topic override, then schema).
    pub fn retries_for(&self, topic: &TopicSchema) -> Option<u32> {
        topic
            .malformed_json_retries
            .or(self.behaviour.malformed_json_retries)
    }

    /// Checks structural consistency.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when the layout is ambiguous, ids collide,
    /// the first topic is conditional, a rule references an undeclared field,
    /// or a scored topic's threshold is outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        match (self.topics.is_empty(), self.steps.is_empty()) {
            (true, true) => return Err(ValidationError::empty_field("topics")),
            (false, false) => {
                return Err(ValidationError::invalid_format(
                    "steps",
                    "declare either flat topics or steps, not both",
                ))
            }
            _ => {}
        }

        let mut step_ids = HashSet::new();
        for step in &self.steps {
            if !step_ids.insert(step.id.as_str()) {
                return Err(ValidationError::duplicate("step", step.id.as_str()));
            }
            if step.topics.is_empty() {
                return Err(ValidationError::empty_field(format!(
                    "steps.{}.topics",
                    step.id
                )));
            }
        }

        let ordered = self.ordered_topics();
        let mut topic_ids = HashSet::new();
        let mut declared_fields = HashSet::new();
        for placed in &ordered {
            let topic = placed.topic;
            if !topic_ids.insert(topic.id.as_str()) {
                return Err(ValidationError::duplicate("topic", topic.id.as_str()));
            }
            let mut keys = HashSet::new();
            for field in &topic.fields {
                if !keys.insert(field.key.as_str()) {
                    return Err(ValidationError::duplicate(
                        format!("field in topic {}", topic.id),
                        field.key.as_str(),
                    ));
                }
                if let FieldKind::ChoiceSet { options } = &field.kind {
                    if options.is_empty() {
                        return Err(ValidationError::empty_field(format!(
                            "{}.options",
                            field.key
                        )));
                    }
                }
                declared_fields.insert(field.key.as_str());
            }
            if let CompletionMode::Scored { min_confidence, .. } = topic.completion {
                if !(0.0..=1.0).contains(&min_confidence) {
                    return Err(ValidationError::out_of_range(
                        format!("{}.completion.minConfidence", topic.id),
                        0.0,
                        1.0,
                        min_confidence,
                    ));
                }
            }
        }

        if let Some(first) = ordered.first() {
            if first.topic.show_if.is_some() {
                return Err(ValidationError::invalid_format(
                    first.topic.id.as_str(),
                    "the first topic cannot carry a visibility rule",
                ));
            }
        }

        for placed in &ordered {
            if let Some(rule) = &placed.topic.show_if {
                if !declared_fields.contains(rule.field.as_str()) {
                    return Err(ValidationError::invalid_format(
                        placed.topic.id.as_str(),
                        format!("visibility rule references unknown field '{}'", rule.field),
                    ));
                }
            }
        }

        Ok(())
    }
}
