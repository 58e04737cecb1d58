//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! - `MockAIProvider` - Scripted responses for tests and local runs
//! - `OpenAIProvider` - OpenAI chat completions
//! - `AnthropicProvider` - Anthropic Messages API

mod anthropic_provider;
mod mock_provider;
mod openai_provider;

pub use anthropic_provider::{AnthropicConfig, AnthropicProvider};
pub use mock_provider::{MockAIProvider, MockError, MockResponse, DEFAULT_MOCK_RESPONSE};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
