//! Locating and parsing the JSON object inside free-form model output.
//!
//! Models wrap JSON in prose or markdown fences; everything here works on
//! the raw text and returns the first well-formed object it finds.

use serde_json::{Map, Value};
use thiserror::Error;

/// Maximum accepted model output (100KB).
pub const MAX_OUTPUT_LENGTH: usize = 100_000;

/// Why a JSON object could not be read from model output.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JsonExtractError {
    #[error("output too long: {actual} bytes exceeds maximum of {max} bytes")]
    TooLong { max: usize, actual: usize },

    #[error("no JSON object found in output")]
    NotFound,

    #[error("JSON parse error: {0}")]
    Parse(String),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Parses the first JSON object in `raw`.
///
/// Fenced ```` ```json ```` blocks are preferred; otherwise the first
/// balanced `{ ... }` span is used.
pub fn extract_json_object(raw: &str) -> Result<Map<String, Value>, JsonExtractError> {
    if raw.len() > MAX_OUTPUT_LENGTH {
        return Err(JsonExtractError::TooLong {
            max: MAX_OUTPUT_LENGTH,
            actual: raw.len(),
        });
    }

    let cleaned = strip_control_chars(raw);
    let trimmed = cleaned.trim();

    let candidate = from_code_block(trimmed)
        .or_else(|| first_balanced_object(trimmed))
        .ok_or(JsonExtractError::NotFound)?;

    match serde_json::from_str::<Value>(candidate)
        .map_err(|e| JsonExtractError::Parse(e.to_string()))?
    {
        Value::Object(map) => Ok(map),
        other => Err(JsonExtractError::NotAnObject(kind_name(&other))),
    }
}

fn strip_control_chars(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
        .collect()
}

fn from_code_block(s: &str) -> Option<&str> {
    let patterns = ["```json\n", "```json\r\n", "```\n", "```\r\n"];

    for pattern in patterns {
        if let Some(start) = s.find(pattern) {
            let body_start = start + pattern.len();
            if let Some(end) = s[body_start..].find("```") {
                let body = s[body_start..body_start + end].trim();
                if body.starts_with('{') {
                    return Some(body);
                }
            }
        }
    }
    None
}

fn first_balanced_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, c) in s[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_object() {
        let map = extract_json_object(r#"{"value":"hi","confidence":0.5}"#).unwrap();
        assert_eq!(map["value"], "hi");
    }

    #[test]
    fn finds_object_inside_prose() {
        let raw = "Sure! Here is the data: {\"a\": {\"b\": 1}} Let me know.";
        let map = extract_json_object(raw).unwrap();
        assert_eq!(map["a"]["b"], 1);
    }

    #[test]
    fn prefers_fenced_block() {
        let raw = "Notes {not json}\n```json\n{\"x\": \"y\"}\n```";
        let map = extract_json_object(raw).unwrap();
        assert_eq!(map["x"], "y");
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_depth() {
        let raw = r#"{"text": "a } brace", "n": 2} trailing"#;
        let map = extract_json_object(raw).unwrap();
        assert_eq!(map["n"], 2);
    }

    #[test]
    fn handles_multibyte_text_before_object() {
        let raw = "Voilà – résumé: {\"k\": \"ü\"}";
        let map = extract_json_object(raw).unwrap();
        assert_eq!(map["k"], "ü");
    }

    #[test]
    fn plain_text_is_not_found() {
        assert_eq!(
            extract_json_object("I am not JSON"),
            Err(JsonExtractError::NotFound)
        );
    }

    #[test]
    fn unbalanced_object_is_not_found() {
        assert_eq!(
            extract_json_object("{\"a\": 1"),
            Err(JsonExtractError::NotFound)
        );
    }

    #[test]
    fn malformed_object_is_parse_error() {
        assert!(matches!(
            extract_json_object("{a: 1}"),
            Err(JsonExtractError::Parse(_))
        ));
    }

    #[test]
    fn rejects_oversized_output() {
        let raw = "x".repeat(MAX_OUTPUT_LENGTH + 1);
        assert!(matches!(
            extract_json_object(&raw),
            Err(JsonExtractError::TooLong { .. })
        ));
    }
}
