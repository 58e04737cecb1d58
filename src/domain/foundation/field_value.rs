//! Field value - a single collected datum.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value captured for a field: free text or a set of chosen options.
///
/// Serialized untagged so the wire form is either `"text"` or `["a", "b"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Choices(Vec<String>),
}

impl FieldValue {
    /// Creates a text value.
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Creates a choice-set value.
    pub fn choices<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::Choices(values.into_iter().map(Into::into).collect())
    }

    /// True for a non-blank string or a non-empty set.
    pub fn is_filled(&self) -> bool {
        match self {
            FieldValue::Text(s) => !s.trim().is_empty(),
            FieldValue::Choices(items) => !items.is_empty(),
        }
    }

    /// Renders the value for prompts and documents.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Choices(items) => items.join(", "),
        }
    }
}

/// Map of field key to captured value, ordered by key for stable output.
pub type FieldMap = BTreeMap<String, FieldValue>;
