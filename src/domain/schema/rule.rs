//! Visibility rules.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::FieldValue;

/// Predicate deciding whether a topic is shown, evaluated against
/// field values already collected anywhere in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityRule {
    pub field: String,
    pub operator: RuleOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
}

/// Comparison applied by a [`VisibilityRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOperator {
    NotEmpty,
    Equals,
    Contains,
    /// Any operator name this build does not understand; never matches.
    #[serde(other)]
    Unknown,
}

impl VisibilityRule {
    pub fn not_empty(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: RuleOperator::NotEmpty,
            value: None,
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: RuleOperator::Equals,
            value: Some(FieldValue::text(value)),
        }
    }

    pub fn contains(field: impl Into<String>, value: FieldValue) -> Self {
        Self {
            field: field.into(),
            operator: RuleOperator::Contains,
            value: Some(value),
        }
    }
}
