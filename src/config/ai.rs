//! AI provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Which provider answers model calls
    #[serde(default)]
    pub provider: AiProvider,

    pub openai_api_key: Option<Secret<String>>,

    pub anthropic_api_key: Option<Secret<String>>,

    /// Overrides the provider's default model
    pub model: Option<String>,

    /// Overrides the provider's API base URL
    pub base_url: Option<String>,

    /// HTTP client timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Provider-level retries for rate limits and transient failures
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

/// AI provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    OpenAI,
    Anthropic,
    /// Scripted responses; for local runs without an API key
    Mock,
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_openai(&self) -> bool {
        has_key(&self.openai_api_key)
    }

    pub fn has_anthropic(&self) -> bool {
        has_key(&self.anthropic_api_key)
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.provider {
            AiProvider::OpenAI if !self.has_openai() => {
                Err(ValidationError::MissingRequired("OPENAI_API_KEY"))
            }
            AiProvider::Anthropic if !self.has_anthropic() => {
                Err(ValidationError::MissingRequired("ANTHROPIC_API_KEY"))
            }
            _ => Ok(()),
        }
    }
}

fn has_key(key: &Option<Secret<String>>) -> bool {
    key.as_ref()
        .is_some_and(|k| !k.expose_secret().trim().is_empty())
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            openai_api_key: None,
            anthropic_api_key: None,
            model: None,
            base_url: None,
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.provider, AiProvider::OpenAI);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_validation_missing_key() {
        let config = AiConfig::default();
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("OPENAI_API_KEY"))
        );

        let config = AiConfig {
            provider: AiProvider::Anthropic,
            openai_api_key: Some(Secret::new("sk-xxx".to_string())),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = AiConfig {
            openai_api_key: Some(Secret::new("  ".to_string())),
            ..Default::default()
        };
        assert!(!config.has_openai());
    }

    #[test]
    fn test_validation_valid_config() {
        let config = AiConfig {
            provider: AiProvider::Anthropic,
            anthropic_api_key: Some(Secret::new("sk-ant-xxx".to_string())),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mock_needs_no_key() {
        let config = AiConfig {
            provider: AiProvider::Mock,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
