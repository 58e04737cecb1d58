//! Bounded retry around unreliable model output.
//!
//! [`retry`] is a plain combinator: it re-runs an attempt until it
//! succeeds, fails fatally, or the attempt budget runs out. Fallback
//! values are built by callers at the `Exhausted` boundary.

use serde_json::Value;
use std::future::Future;
use thiserror::Error;

use super::json::extract_json_object;
use super::model::ModelClient;
use crate::domain::session::TopicScore;
use crate::ports::{AIError, CompletionRequest};

/// Value shown when a scored evaluation never produced valid output.
pub const FALLBACK_VALUE: &str =
    "I apologize, but I encountered an error. Could you please rephrase your answer?";

/// Marker placed in `missing` for the fallback score.
pub const FALLBACK_MISSING: &str = "valid response";

/// Outcome of a single failed attempt.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// Malformed output or timeout; another attempt may succeed.
    #[error("retryable: {0}")]
    Retryable(String),

    /// Stop immediately.
    #[error(transparent)]
    Fatal(AIError),
}

impl AttemptError {
    /// Classifies a provider error: timeouts are retried, everything else is fatal.
    pub fn from_provider(err: AIError) -> Self {
        if err.is_timeout() {
            AttemptError::Retryable(err.to_string())
        } else {
            AttemptError::Fatal(err)
        }
    }
}

/// Why [`retry`] gave up.
#[derive(Debug, Error)]
pub enum RetryError {
    #[error("gave up after {attempts} attempts: {last_reason}")]
    Exhausted { attempts: u32, last_reason: String },

    #[error(transparent)]
    Fatal(AIError),
}

/// Runs `attempt` up to `max_attempts` times (at least once).
///
/// The closure receives the 1-based attempt number.
pub async fn retry<T, F, Fut>(max_attempts: u32, mut attempt: F) -> Result<T, RetryError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut last_reason = String::new();

    for n in 1..=max_attempts {
        match attempt(n).await {
            Ok(value) => return Ok(value),
            Err(AttemptError::Fatal(err)) => return Err(RetryError::Fatal(err)),
            Err(AttemptError::Retryable(reason)) => {
                if n < max_attempts {
                    tracing::info!(attempt = n, reason = %reason, "retrying model call");
                }
                last_reason = reason;
            }
        }
    }

    Err(RetryError::Exhausted {
        attempts: max_attempts,
        last_reason,
    })
}

/// Validates a scored evaluation object.
///
/// `value` must be a non-blank string, `confidence` a number and
/// `needsMoreInput` a boolean; `missing` is optional.
pub fn parse_scored(raw: &str) -> Result<TopicScore, String> {
    let object = extract_json_object(raw).map_err(|e| e.to_string())?;

    let value = match object.get("value") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => return Err("`value` must be a non-empty string".to_string()),
    };
    let confidence = object
        .get("confidence")
        .and_then(Value::as_f64)
        .ok_or_else(|| "`confidence` must be a number".to_string())?;
    let needs_more_input = object
        .get("needsMoreInput")
        .and_then(Value::as_bool)
        .ok_or_else(|| "`needsMoreInput` must be a boolean".to_string())?;
    let missing = match object.get("missing") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    Ok(TopicScore {
        value,
        confidence,
        needs_more_input,
        missing,
    })
}

/// The deterministic score used when retries are exhausted.
pub fn scored_fallback() -> TopicScore {
    TopicScore {
        value: FALLBACK_VALUE.to_string(),
        confidence: 0.0,
        needs_more_input: true,
        missing: vec![FALLBACK_MISSING.to_string()],
    }
}

/// Result of [`call_scored`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCall {
    pub score: TopicScore,
    pub attempts: u32,
    pub fell_back: bool,
}

/// Requests a scored evaluation, retrying malformed output up to
/// `max_retries` additional times before falling back.
///
/// # Errors
///
/// Only non-timeout provider failures are returned.
pub async fn call_scored(
    client: &ModelClient,
    request: CompletionRequest,
    max_retries: u32,
) -> Result<ScoredCall, AIError> {
    let mut attempts = 0;
    let result = retry(max_retries.saturating_add(1), |_| {
        attempts += 1;
        let request = request.clone();
        async move {
            let raw = client
                .complete_text(request)
                .await
                .map_err(AttemptError::from_provider)?;
            parse_scored(&raw).map_err(AttemptError::Retryable)
        }
    })
    .await;

    match result {
        Ok(score) => Ok(ScoredCall {
            score,
            attempts,
            fell_back: false,
        }),
        Err(RetryError::Exhausted {
            attempts,
            last_reason,
        }) => {
            tracing::warn!(attempts, reason = %last_reason, "scored evaluation fell back");
            Ok(ScoredCall {
                score: scored_fallback(),
                attempts,
                fell_back: true,
            })
        }
        Err(RetryError::Fatal(err)) => Err(err),
    }
}

/// Requests free text, retrying blank output and timeouts.
///
/// Returns `None` when retries are exhausted so the caller can substitute
/// its own wording.
pub async fn call_text(
    client: &ModelClient,
    request: CompletionRequest,
    max_retries: u32,
) -> Result<Option<String>, AIError> {
    let result = retry(max_retries.saturating_add(1), |_| {
        let request = request.clone();
        async move {
            let raw = client
                .complete_text(request)
                .await
                .map_err(AttemptError::from_provider)?;
            let text = raw.trim();
            if text.is_empty() {
                Err(AttemptError::Retryable("empty reply".to_string()))
            } else {
                Ok(text.to_string())
            }
        }
    })
    .await;

    match result {
        Ok(text) => Ok(Some(text)),
        Err(RetryError::Exhausted {
            attempts,
            last_reason,
        }) => {
            tracing::warn!(attempts, reason = %last_reason, "reply generation fell back");
            Ok(None)
        }
        Err(RetryError::Fatal(err)) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::foundation::SessionId;
    use crate::ports::{MessageRole, RequestMetadata};
    use std::sync::Arc;
    use std::time::Duration;

    const VALID: &str = r#"{"value":"Great pitch","confidence":0.9,"needsMoreInput":false}"#;

    fn client(provider: &MockAIProvider) -> ModelClient {
        ModelClient::new(Arc::new(provider.clone()), Duration::from_secs(5))
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new(SessionId::new(), "trace"))
            .with_message(MessageRole::User, "evaluate")
    }

    #[tokio::test]
    async fn retry_stops_at_first_success() {
        let mut calls = 0;
        let result: Result<u32, _> = retry(5, |n| {
            calls += 1;
            async move {
                if n < 3 {
                    Err(AttemptError::Retryable("bad".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn retry_reports_exhaustion() {
        let result: Result<(), _> =
            retry(2, |n| async move { Err(AttemptError::Retryable(format!("bad {n}"))) }).await;
        match result {
            Err(RetryError::Exhausted {
                attempts,
                last_reason,
            }) => {
                assert_eq!(attempts, 2);
                assert_eq!(last_reason, "bad 2");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn retry_runs_at_least_once() {
        let result: Result<u8, _> = retry(0, |_| async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn fatal_error_stops_immediately() {
        let mut calls = 0;
        let result: Result<(), _> = retry(5, |_| {
            calls += 1;
            async { Err(AttemptError::Fatal(AIError::AuthenticationFailed)) }
        })
        .await;
        assert!(matches!(result, Err(RetryError::Fatal(AIError::AuthenticationFailed))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn parse_scored_validates_shape() {
        let score = parse_scored(VALID).unwrap();
        assert_eq!(score.value, "Great pitch");
        assert!(!score.needs_more_input);
        assert!(score.missing.is_empty());

        assert!(parse_scored(r#"{"value":"x","confidence":"high","needsMoreInput":false}"#).is_err());
        assert!(parse_scored(r#"{"value":"x","confidence":0.5,"needsMoreInput":"no"}"#).is_err());
        assert!(parse_scored(r#"{"value":" ","confidence":0.5,"needsMoreInput":true}"#).is_err());
        assert!(parse_scored("plain text").is_err());

        let with_missing = parse_scored(
            r#"{"value":"x","confidence":0.2,"needsMoreInput":true,"missing":["budget",3]}"#,
        )
        .unwrap();
        assert_eq!(with_missing.missing, ["budget"]);
    }

    #[tokio::test]
    async fn two_malformed_then_valid_within_two_retries() {
        let provider = MockAIProvider::new()
            .with_response("not json")
            .with_response("still not json")
            .with_response(VALID);

        let call = call_scored(&client(&provider), request(), 2).await.unwrap();

        assert!(!call.fell_back);
        assert_eq!(call.attempts, 3);
        assert_eq!(call.score.value, "Great pitch");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn never_valid_returns_fallback() {
        let provider = MockAIProvider::new()
            .with_response("nope")
            .with_response("nope again")
            .with_response(VALID);

        let call = call_scored(&client(&provider), request(), 1).await.unwrap();

        assert!(call.fell_back);
        assert_eq!(call.score, scored_fallback());
        assert_eq!(call.score.confidence, 0.0);
        assert!(call.score.needs_more_input);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn timeout_is_retried() {
        let provider = MockAIProvider::new()
            .with_error(MockError::Timeout { timeout_secs: 1 })
            .with_response(VALID);

        let call = call_scored(&client(&provider), request(), 1).await.unwrap();
        assert!(!call.fell_back);
        assert_eq!(call.attempts, 2);
    }

    #[tokio::test]
    async fn provider_failure_is_fatal() {
        let provider = MockAIProvider::new().with_error(MockError::Unavailable {
            message: "down".into(),
        });

        let err = call_scored(&client(&provider), request(), 3).await.unwrap_err();
        assert!(matches!(err, AIError::Unavailable { .. }));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn call_text_retries_blank_then_gives_up() {
        let provider = MockAIProvider::new().with_response("  ").with_response("Hello?");
        let text = call_text(&client(&provider), request(), 1).await.unwrap();
        assert_eq!(text.as_deref(), Some("Hello?"));

        let provider = MockAIProvider::new().with_response("").with_response("");
        let text = call_text(&client(&provider), request(), 1).await.unwrap();
        assert!(text.is_none());
    }
}
