//! Topic and step schemas.

use serde::{Deserialize, Serialize};

use super::field::FieldSpec;
use super::rule::VisibilityRule;
use crate::domain::foundation::{StepId, TopicId};

/// One unit of the conversation targeting a specific piece of information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSchema {
    pub id: TopicId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Opening question posted when the topic becomes active.
    #[serde(alias = "question")]
    pub intro: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_if: Option<VisibilityRule>,
    #[serde(default)]
    pub completion: CompletionMode,
    #[serde(default)]
    pub prompts: TopicPrompts,
    /// Overrides the schema-level transcript window for this topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_window: Option<usize>,
    /// Overrides the schema-level malformed-JSON retry bound for this topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub malformed_json_retries: Option<u32>,
}

impl TopicSchema {
    /// Fields flagged as required.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Looks up a declared field by key.
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }
}

/// How a topic decides it has been answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CompletionMode {
    /// Complete once every required field holds a non-empty value.
    #[default]
    RequiredFields,
    /// Complete once the model reports `needsMoreInput = false` with
    /// confidence at or above `min_confidence`.
    Scored {
        #[serde(rename = "minConfidence")]
        min_confidence: f64,
        #[serde(rename = "prePrompt")]
        pre_prompt: String,
    },
}

/// Prompt text attached to a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TopicPrompts {
    /// Persona/instructions for conversational replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Extra guidance appended to the extraction prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_hint: Option<String>,
}

/// Ordered group of topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSchema {
    pub id: StepId,
    pub title: String,
    pub topics: Vec<TopicSchema>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_defaults_to_required_fields() {
        let topic: TopicSchema = serde_json::from_str(
            r#"{"id":"goals","title":"Goals","intro":"What are your goals?"}"#,
        )
        .unwrap();
        assert_eq!(topic.completion, CompletionMode::RequiredFields);
        assert!(topic.fields.is_empty());
        assert!(topic.show_if.is_none());
    }

    #[test]
    fn question_is_accepted_as_intro() {
        let topic: TopicSchema =
            serde_json::from_str(r#"{"id":"a","title":"A","question":"Tell me"}"#).unwrap();
        assert_eq!(topic.intro, "Tell me");
    }

    #[test]
    fn scored_mode_parses() {
        let topic: TopicSchema = serde_json::from_str(
            r#"{"id":"pitch","title":"Pitch","intro":"Pitch it",
                "completion":{"mode":"scored","minConfidence":0.8,"prePrompt":"Evaluate"}}"#,
        )
        .unwrap();
        assert_eq!(
            topic.completion,
            CompletionMode::Scored {
                min_confidence: 0.8,
                pre_prompt: "Evaluate".to_string()
            }
        );
    }

    #[test]
    fn required_fields_filters() {
        let topic = TopicSchema {
            id: TopicId::new("t").unwrap(),
            title: "T".into(),
            description: String::new(),
            intro: "?".into(),
            fields: vec![
                FieldSpec::text("a", "A", true),
                FieldSpec::text("b", "B", false),
            ],
            show_if: None,
            completion: CompletionMode::RequiredFields,
            prompts: TopicPrompts::default(),
            transcript_window: None,
            malformed_json_retries: None,
        };
        let keys: Vec<_> = topic.required_fields().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, ["a"]);
        assert!(topic.field("b").is_some());
    }
}
