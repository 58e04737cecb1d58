//! Field extraction.
//!
//! One model call turns the recent transcript into a JSON object keyed by
//! field; the object is then coerced against each field's declared kind.
//! Extraction never fails the turn: any problem yields an empty delta.

use serde_json::{Map, Value};

use super::json::extract_json_object;
use super::model::ModelClient;
use crate::domain::foundation::{FieldMap, FieldValue};
use crate::domain::schema::{FieldKind, FieldSpec};
use crate::ports::{CallPurpose, CompletionRequest, MessageRole, RequestMetadata};

const EXTRACTION_SYSTEM_PROMPT: &str = "You are a data extraction assistant. Extract structured \
data from conversations and return valid JSON. Respect field types: use strings for text fields \
and arrays for multiselect fields.";

/// Extracts typed field values from conversation text.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    client: ModelClient,
}

impl FieldExtractor {
    pub fn new(client: ModelClient) -> Self {
        Self { client }
    }

    /// Runs one extraction call. Returns an empty map on any failure.
    pub async fn extract(
        &self,
        conversation: &str,
        fields: &[FieldSpec],
        hint: Option<&str>,
        metadata: RequestMetadata,
    ) -> FieldMap {
        if fields.is_empty() {
            return FieldMap::new();
        }

        let request = CompletionRequest::new(metadata)
            .with_system_prompt(EXTRACTION_SYSTEM_PROMPT)
            .with_message(
                MessageRole::User,
                build_extraction_prompt(conversation, fields, hint),
            )
            .with_temperature(0.0)
            .with_purpose(CallPurpose::Extraction);

        let raw = match self.client.complete_text(request).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(error = %err, "field extraction call failed");
                return FieldMap::new();
            }
        };

        match extract_json_object(&raw) {
            Ok(object) => {
                let extracted = coerce_extracted(&object, fields);
                tracing::debug!(
                    extracted = extracted.len(),
                    "fields extracted"
                );
                extracted
            }
            Err(err) => {
                tracing::warn!(error = %err, "field extraction output was not usable JSON");
                FieldMap::new()
            }
        }
    }
}

/// Builds the user prompt listing every field with its type and options.
pub fn build_extraction_prompt(conversation: &str, fields: &[FieldSpec], hint: Option<&str>) -> String {
    let descriptions = fields
        .iter()
        .map(|f| {
            let requirement = if f.required { "required" } else { "optional" };
            match &f.kind {
                FieldKind::Text => format!("- {}: {} (string, {})", f.key, f.label, requirement),
                FieldKind::ChoiceSet { options } => format!(
                    "- {}: {} (array, {}, must only contain values from: {})",
                    f.key,
                    f.label,
                    requirement,
                    options
                        .iter()
                        .map(|o| format!("\"{}\"", o))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut prompt = format!(
        "Extract the following information from this conversation:\n\n{}\n\n\
         Conversation:\n{}\n\n\
         For each field, extract the value if mentioned. If not mentioned or unclear, return an \
         empty string for text fields or an empty array for multiselect fields.\n\
         For multiselect fields, return an array of selected values. Only include values that \
         exactly match the allowed options listed above.\n\
         Return the data as JSON with keys matching the field names.",
        descriptions, conversation
    );

    if let Some(hint) = hint.filter(|h| !h.trim().is_empty()) {
        prompt.push_str("\n\n");
        prompt.push_str(hint.trim());
    }

    prompt
}

/// Coerces a parsed model object against the declared fields.
///
/// Unknown keys are dropped. Text values are stringified; blank text is
/// omitted. Choice values are filtered to declared options, deduplicated
/// and omitted when nothing survives.
pub fn coerce_extracted(raw: &Map<String, Value>, fields: &[FieldSpec]) -> FieldMap {
    let mut result = FieldMap::new();

    for field in fields {
        let Some(value) = raw.get(&field.key) else {
            continue;
        };

        let coerced = match &field.kind {
            FieldKind::Text => coerce_text(value).map(FieldValue::Text),
            FieldKind::ChoiceSet { .. } => coerce_choices(value, field).map(FieldValue::Choices),
        };

        if let Some(v) = coerced {
            result.insert(field.key.clone(), v);
        }
    }

    result
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(scalar_to_string)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_to_string(other)?,
    };
    (!text.trim().is_empty()).then_some(text)
}

fn coerce_choices(value: &Value, field: &FieldSpec) -> Option<Vec<String>> {
    let candidates: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(scalar_to_string).collect(),
        other => scalar_to_string(other).into_iter().collect(),
    };

    let mut chosen: Vec<String> = Vec::new();
    for candidate in candidates {
        if field.allows(&candidate) && !chosen.contains(&candidate) {
            chosen.push(candidate);
        }
    }

    (!chosen.is_empty()).then_some(chosen)
}

/// True iff every required field holds a filled value.
pub fn check_completion(values: &FieldMap, fields: &[FieldSpec]) -> bool {
    fields
        .iter()
        .filter(|f| f.required)
        .all(|f| values.get(&f.key).is_some_and(FieldValue::is_filled))
}

/// Required fields still lacking a filled value, in declaration order.
pub fn missing_required<'a>(values: &FieldMap, fields: &'a [FieldSpec]) -> Vec<&'a FieldSpec> {
    fields
        .iter()
        .filter(|f| f.required)
        .filter(|f| !values.get(&f.key).is_some_and(FieldValue::is_filled))
        .collect()
}
