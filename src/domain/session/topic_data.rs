//! Per-topic conversation data.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{FieldMap, FieldValue};

/// Lifecycle of a topic within a session.
///
/// Valid transitions: `NotStarted → InProgress → Complete`, and
/// `Complete → InProgress` only through an explicit revisit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TopicStatus {
    #[default]
    NotStarted,
    InProgress,
    Complete,
}

impl TopicStatus {
    /// Returns true if a transition to `target` is allowed.
    pub fn can_transition_to(&self, target: TopicStatus) -> bool {
        matches!(
            (self, target),
            (TopicStatus::NotStarted, TopicStatus::InProgress)
                | (TopicStatus::InProgress, TopicStatus::Complete)
                | (TopicStatus::Complete, TopicStatus::InProgress)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid topic status transition: {from:?} -> {to:?}")]
pub struct InvalidStatusTransition {
    pub from: TopicStatus,
    pub to: TopicStatus,
}

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One exchanged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: Role,
    pub text: String,
}

/// Model assessment for scored topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicScore {
    pub value: String,
    pub confidence: f64,
    pub needs_more_input: bool,
    #[serde(default)]
    pub missing: Vec<String>,
}

/// Mutable state of one topic in one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TopicData {
    pub transcript: Vec<TranscriptMessage>,
    pub fields: FieldMap,
    pub status: TopicStatus,
    #[serde(default)]
    pub revisit_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<TopicScore>,
}

impl TopicData {
    /// Moves the topic to `target` if the transition is allowed.
    pub fn transition(&mut self, target: TopicStatus) -> Result<(), InvalidStatusTransition> {
        if !self.status.can_transition_to(target) {
            return Err(InvalidStatusTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }

    /// Starts the topic if it has not been started yet.
    pub fn begin(&mut self) {
        if self.status == TopicStatus::NotStarted {
            self.status = TopicStatus::InProgress;
        }
    }

    /// Reopens a completed topic for a revisit and bumps the revisit counter.
    pub fn reopen(&mut self) -> Result<(), InvalidStatusTransition> {
        if self.status != TopicStatus::Complete {
            return Err(InvalidStatusTransition {
                from: self.status,
                to: TopicStatus::InProgress,
            });
        }
        self.transition(TopicStatus::InProgress)?;
        self.revisit_count += 1;
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.status == TopicStatus::Complete
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.transcript.push(TranscriptMessage {
            role: Role::User,
            text: text.into(),
        });
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.transcript.push(TranscriptMessage {
            role: Role::Assistant,
            text: text.into(),
        });
    }

    /// Merges extracted values; existing keys are overwritten, none removed.
    pub fn merge_fields(&mut self, delta: FieldMap) {
        for (key, value) in delta {
            self.fields.insert(key, value);
        }
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// The most recent `window` messages (all of them when `window` is 0).
    pub fn recent_transcript(&self, window: usize) -> &[TranscriptMessage] {
        if window == 0 || self.transcript.len() <= window {
            &self.transcript
        } else {
            &self.transcript[self.transcript.len() - window..]
        }
    }

    /// Renders recent messages as `role: text` lines for prompts.
    pub fn conversation_text(&self, window: usize) -> String {
        self.recent_transcript(window)
            .iter()
            .map(|m| format!("{}: {}", m.role.as_str(), m.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn last_assistant_message(&self) -> Option<&str> {
        self.transcript
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.text.as_str())
    }
}
