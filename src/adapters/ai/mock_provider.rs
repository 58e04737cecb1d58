//! Mock AI Provider for testing.
//!
//! Scripted implementation of the AIProvider port so the engine, the
//! handlers and the HTTP surface can be exercised without a real model.
//!
//! # Features
//!
//! - Pre-configured responses, consumed in order
//! - Per-purpose queues (extraction, reply, scored evaluation)
//! - Simulated delays for timeout testing
//! - Error injection
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response_for(CallPurpose::Extraction, r#"{"goal": "Ship v2"}"#)
//!     .with_response("What is the deadline?");
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CallPurpose, CompletionRequest, CompletionResponse, FinishReason,
    ProviderInfo, TokenUsage,
};

/// Content returned once every queue is empty.
pub const DEFAULT_MOCK_RESPONSE: &str = "Mock response";

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Responses for any call, consumed in order.
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Responses reserved for one call purpose; checked first.
    by_purpose: Arc<Mutex<HashMap<CallPurpose, VecDeque<MockResponse>>>>,
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success { content: String },
    Error(MockError),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => {
                AIError::timeout(Duration::from_secs(timeout_secs.into()))
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            by_purpose: Arc::new(Mutex::new(HashMap::new())),
            info: ProviderInfo::new("mock", "mock-model-1", 128_000),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the shared queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(None, MockResponse::Success {
            content: content.into(),
        })
    }

    /// Adds a successful response served only to calls with `purpose`.
    pub fn with_response_for(self, purpose: CallPurpose, content: impl Into<String>) -> Self {
        self.push(
            Some(purpose),
            MockResponse::Success {
                content: content.into(),
            },
        )
    }

    /// Adds an error response to the shared queue.
    pub fn with_error(self, error: MockError) -> Self {
        self.push(None, MockResponse::Error(error))
    }

    /// Adds an error served only to calls with `purpose`.
    pub fn with_error_for(self, purpose: CallPurpose, error: MockError) -> Self {
        self.push(Some(purpose), MockResponse::Error(error))
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Queues a response on an already shared provider.
    pub fn enqueue(&self, content: impl Into<String>) {
        lock(&self.responses).push_back(MockResponse::Success {
            content: content.into(),
        });
    }

    /// Queues a purpose-specific response on an already shared provider.
    pub fn enqueue_for(&self, purpose: CallPurpose, content: impl Into<String>) {
        lock(&self.by_purpose)
            .entry(purpose)
            .or_default()
            .push_back(MockResponse::Success {
                content: content.into(),
            });
    }

    /// Queues a purpose-specific error on an already shared provider.
    pub fn enqueue_error_for(&self, purpose: CallPurpose, error: MockError) {
        lock(&self.by_purpose)
            .entry(purpose)
            .or_default()
            .push_back(MockResponse::Error(error));
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Number of calls made with `purpose`.
    pub fn call_count_for(&self, purpose: CallPurpose) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.purpose == Some(purpose))
            .count()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        lock(&self.calls).clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    fn push(self, purpose: Option<CallPurpose>, response: MockResponse) -> Self {
        match purpose {
            Some(p) => lock(&self.by_purpose)
                .entry(p)
                .or_default()
                .push_back(response),
            None => lock(&self.responses).push_back(response),
        }
        self
    }

    fn next_response(&self, purpose: Option<CallPurpose>) -> MockResponse {
        if let Some(p) = purpose {
            if let Some(response) = lock(&self.by_purpose)
                .get_mut(&p)
                .and_then(VecDeque::pop_front)
            {
                return response;
            }
        }
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success {
                content: DEFAULT_MOCK_RESPONSE.to_string(),
            })
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let purpose = request.purpose;
        lock(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response(purpose) {
            MockResponse::Success { content } => Ok(CompletionResponse {
                content,
                usage: TokenUsage::new(10, 20),
                model: self.info.model.clone(),
                finish_reason: FinishReason::Stop,
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
