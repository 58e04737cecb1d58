//! Field specifications.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Declared shape of one field a topic collects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFieldSpec", into = "RawFieldSpec")]
pub struct FieldSpec {
    pub key: String,
    pub label: String,
    pub required: bool,
    pub kind: FieldKind,
}

/// Kind of value a field accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, stored as a string.
    Text,
    /// Closed option list, stored as a set of strings drawn from `options`.
    ChoiceSet { options: Vec<String> },
}

impl FieldSpec {
    /// Creates a text field.
    pub fn text(key: impl Into<String>, label: impl Into<String>, required: bool) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            required,
            kind: FieldKind::Text,
        }
    }

    /// Creates a choice-set field.
    pub fn choice_set<I, S>(
        key: impl Into<String>,
        label: impl Into<String>,
        required: bool,
        options: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            label: label.into(),
            required,
            kind: FieldKind::ChoiceSet {
                options: options.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Options for choice-set fields, `None` for text.
    pub fn options(&self) -> Option<&[String]> {
        match &self.kind {
            FieldKind::Text => None,
            FieldKind::ChoiceSet { options } => Some(options),
        }
    }

    /// True when `candidate` is one of the declared options.
    pub fn allows(&self, candidate: &str) -> bool {
        match &self.kind {
            FieldKind::Text => true,
            FieldKind::ChoiceSet { options } => options.iter().any(|o| o == candidate),
        }
    }
}

/// Wire form: `{"key", "label", "required", "type": "text" | "multiselect", "options"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawFieldSpec {
    key: String,
    label: String,
    #[serde(default)]
    required: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<String>>,
}

impl TryFrom<RawFieldSpec> for FieldSpec {
    type Error = ValidationError;

    fn try_from(raw: RawFieldSpec) -> Result<Self, Self::Error> {
        if raw.key.trim().is_empty() {
            return Err(ValidationError::empty_field("field.key"));
        }

        let kind = match raw.kind.as_deref().unwrap_or("text") {
            "text" => FieldKind::Text,
            "multiselect" | "choice_set" => {
                let options = raw.options.unwrap_or_default();
                if options.is_empty() {
                    return Err(ValidationError::invalid_format(
                        raw.key,
                        "choice-set fields must declare at least one option",
                    ));
                }
                FieldKind::ChoiceSet { options }
            }
            other => {
                return Err(ValidationError::invalid_format(
                    raw.key,
                    format!("unknown field type '{}'", other),
                ))
            }
        };

        Ok(FieldSpec {
            key: raw.key,
            label: raw.label,
            required: raw.required,
            kind,
        })
    }
}

impl From<FieldSpec> for RawFieldSpec {
    fn from(spec: FieldSpec) -> Self {
        let (kind, options) = match spec.kind {
            FieldKind::Text => ("text".to_string(), None),
            FieldKind::ChoiceSet { options } => ("multiselect".to_string(), Some(options)),
        };
        RawFieldSpec {
            key: spec.key,
            label: spec.label,
            required: spec.required,
            kind: Some(kind),
            options,
        }
    }
}
