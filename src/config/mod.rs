//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `TOPIC_FLOW` prefix and
//! `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use topic_flow::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod document;
mod engine;
mod error;
mod server;
mod storage;

pub use ai::{AiConfig, AiProvider};
pub use document::{DocumentConfig, SummaryFormat};
pub use engine::EngineConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults; only the API key of the selected AI provider
/// is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub document: DocumentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` if present
    /// 2. Reads variables with the `TOPIC_FLOW` prefix
    /// 3. Splits nested keys on `__`
    ///
    /// # Environment Variable Format
    ///
    /// - `TOPIC_FLOW__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `TOPIC_FLOW__ENGINE__TRANSCRIPT_WINDOW=6` -> `engine.transcript_window = 6`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TOPIC_FLOW")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.engine.validate()?;
        self.storage.validate()?;
        if self.server.request_timeout_secs < self.engine.llm_timeout_secs {
            return Err(ValidationError::RequestTimeoutTooShort);
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "TOPIC_FLOW__AI__PROVIDER",
        "TOPIC_FLOW__AI__OPENAI_API_KEY",
        "TOPIC_FLOW__SERVER__PORT",
        "TOPIC_FLOW__SERVER__ENVIRONMENT",
        "TOPIC_FLOW__ENGINE__TRANSCRIPT_WINDOW",
        "TOPIC_FLOW__ENGINE__DEFAULT_SCHEMA",
        "TOPIC_FLOW__STORAGE__BACKEND",
        "TOPIC_FLOW__DOCUMENT__FORMAT",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn load_with(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        clear_env();
        for (key, value) in vars {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn test_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let config = load_with(&[]).unwrap();

        assert_eq!(config.server.port, 3001);
        assert_eq!(config.engine.transcript_window, 10);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.ai.provider, AiProvider::OpenAI);
        assert_eq!(config.document.format, SummaryFormat::Docx);
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let config = load_with(&[
            ("TOPIC_FLOW__AI__PROVIDER", "openai"),
            ("TOPIC_FLOW__AI__OPENAI_API_KEY", "sk-test"),
            ("TOPIC_FLOW__SERVER__PORT", "3000"),
            ("TOPIC_FLOW__ENGINE__TRANSCRIPT_WINDOW", "6"),
            ("TOPIC_FLOW__ENGINE__DEFAULT_SCHEMA", "initiative"),
            ("TOPIC_FLOW__STORAGE__BACKEND", "file"),
            ("TOPIC_FLOW__DOCUMENT__FORMAT", "markdown"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.engine.transcript_window, 6);
        assert_eq!(config.engine.default_schema.as_deref(), Some("initiative"));
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.document.format, SummaryFormat::Markdown);
        assert!(config.ai.has_openai());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_provider_key_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let config = load_with(&[]).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let config = load_with(&[
            ("TOPIC_FLOW__SERVER__ENVIRONMENT", "production"),
            ("TOPIC_FLOW__AI__PROVIDER", "mock"),
        ])
        .unwrap();
        assert!(config.is_production());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_request_timeout_must_cover_model_calls() {
        let mut config = AppConfig::default();
        config.ai.provider = AiProvider::Mock;
        config.server.request_timeout_secs = 10;
        config.engine.llm_timeout_secs = 30;
        assert_eq!(
            config.validate(),
            Err(ValidationError::RequestTimeoutTooShort)
        );
    }
}
