//! Timeout-bounded access to the language model.

use std::sync::Arc;
use std::time::Duration;

use crate::ports::{AIError, AIProvider, CompletionRequest};

/// Wraps a provider so every call is bounded by `timeout`.
#[derive(Clone)]
pub struct ModelClient {
    provider: Arc<dyn AIProvider>,
    timeout: Duration,
}

impl ModelClient {
    pub fn new(provider: Arc<dyn AIProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issues one completion and returns its text.
    ///
    /// An elapsed deadline surfaces as [`AIError::Timeout`].
    pub async fn complete_text(&self, request: CompletionRequest) -> Result<String, AIError> {
        match tokio::time::timeout(self.timeout, self.provider.complete(request)).await {
            Ok(Ok(response)) => Ok(response.content),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(AIError::timeout(self.timeout)),
        }
    }
}

impl std::fmt::Debug for ModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelClient")
            .field("provider", &self.provider.provider_info().name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::domain::foundation::SessionId;
    use crate::ports::RequestMetadata;

    fn request() -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new(SessionId::new(), "t"))
    }

    #[tokio::test]
    async fn returns_content() {
        let client = ModelClient::new(
            Arc::new(MockAIProvider::new().with_response("hi")),
            Duration::from_secs(5),
        );
        assert_eq!(client.complete_text(request()).await.unwrap(), "hi");
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let client = ModelClient::new(
            Arc::new(MockAIProvider::new().with_delay(Duration::from_millis(200))),
            Duration::from_millis(20),
        );
        let err = client.complete_text(request()).await.unwrap_err();
        assert!(matches!(err, AIError::Timeout { timeout_ms: 20 }));
    }
}
