//! Conditional topic visibility.
//!
//! Rules are evaluated against field values collected anywhere in the
//! session; the first topic (in schema order) holding the referenced key
//! supplies the value.

use crate::domain::foundation::{FieldValue, TopicId};
use crate::domain::schema::{FlowSchema, PlacedTopic, RuleOperator, VisibilityRule};
use crate::domain::session::{SessionState, TopicStatus};

/// Finds the value stored for `field`, scanning topics in schema order.
fn lookup<'s>(field: &str, schema: &FlowSchema, state: &'s SessionState) -> Option<&'s FieldValue> {
    schema
        .ordered_topics()
        .into_iter()
        .filter_map(|p| state.topic(&p.topic.id))
        .find_map(|data| data.field(field))
}

/// Evaluates `rule` against the session. A missing value evaluates false.
pub fn evaluate(rule: &VisibilityRule, schema: &FlowSchema, state: &SessionState) -> bool {
    let Some(stored) = lookup(&rule.field, schema, state) else {
        return false;
    };

    match rule.operator {
        RuleOperator::NotEmpty => stored.is_filled(),
        RuleOperator::Equals => match (stored, &rule.value) {
            (FieldValue::Text(s), Some(FieldValue::Text(expected))) => s == expected,
            _ => false,
        },
        RuleOperator::Contains => match (stored, &rule.value) {
            (FieldValue::Choices(items), Some(FieldValue::Text(needle))) => items.contains(needle),
            (FieldValue::Choices(items), Some(FieldValue::Choices(wanted))) => {
                wanted.iter().any(|w| items.contains(w))
            }
            (FieldValue::Text(s), Some(FieldValue::Text(needle))) => {
                s.contains(needle.as_str()) || needle.contains(s.as_str())
            }
            _ => false,
        },
        RuleOperator::Unknown => false,
    }
}

/// True when the topic has no rule or its rule holds.
pub fn is_visible(placed: &PlacedTopic<'_>, schema: &FlowSchema, state: &SessionState) -> bool {
    placed
        .topic
        .show_if
        .as_ref()
        .map_or(true, |rule| evaluate(rule, schema, state))
}

/// Visible topics in schema order.
pub fn visible_topics<'a>(schema: &'a FlowSchema, state: &SessionState) -> Vec<PlacedTopic<'a>> {
    schema
        .ordered_topics()
        .into_iter()
        .filter(|p| is_visible(p, schema, state))
        .collect()
}

fn is_incomplete(topic_id: &TopicId, state: &SessionState) -> bool {
    state
        .topic(topic_id)
        .map_or(true, |t| t.status != TopicStatus::Complete)
}

/// First visible, incomplete topic strictly after `current` in schema order.
///
/// When `current` is itself hidden, the search starts after its position in
/// the full schema order.
pub fn next_visible_incomplete<'a>(
    schema: &'a FlowSchema,
    state: &SessionState,
    current: &TopicId,
) -> Option<PlacedTopic<'a>> {
    let ordered = schema.ordered_topics();
    let position = ordered.iter().position(|p| &p.topic.id == current)?;

    ordered
        .into_iter()
        .skip(position + 1)
        .find(|p| is_visible(p, schema, state) && is_incomplete(&p.topic.id, state))
}

/// First visible, incomplete topic anywhere in schema order.
pub fn first_visible_incomplete<'a>(
    schema: &'a FlowSchema,
    state: &SessionState,
) -> Option<PlacedTopic<'a>> {
    visible_topics(schema, state)
        .into_iter()
        .find(|p| is_incomplete(&p.topic.id, state))
}

/// True iff every visible topic is Complete.
pub fn all_visible_complete(schema: &FlowSchema, state: &SessionState) -> bool {
    visible_topics(schema, state)
        .iter()
        .all(|p| !is_incomplete(&p.topic.id, state))
}
