//! Conversation engine configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::engine::{
    EngineSettings, DEFAULT_LLM_TIMEOUT, DEFAULT_MALFORMED_JSON_RETRIES,
    DEFAULT_TRANSCRIPT_WINDOW,
};

/// Engine defaults and schema location
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Directory holding `.json` / `.yaml` schema bundles
    #[serde(default = "default_schema_dir")]
    pub schema_dir: PathBuf,

    /// Schema active at startup; first by name when unset
    pub default_schema: Option<String>,

    /// Messages of transcript included in prompts
    #[serde(default = "default_transcript_window")]
    pub transcript_window: usize,

    /// Extra attempts when the model returns unusable output
    #[serde(default = "default_malformed_json_retries")]
    pub malformed_json_retries: u32,

    /// Bound on a single model call, in seconds
    #[serde(default = "default_llm_timeout")]
    pub llm_timeout_secs: u64,
}

impl EngineConfig {
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            transcript_window: self.transcript_window,
            malformed_json_retries: self.malformed_json_retries,
            llm_timeout: self.llm_timeout(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.schema_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("ENGINE__SCHEMA_DIR"));
        }
        if self.transcript_window == 0 {
            return Err(ValidationError::InvalidTranscriptWindow);
        }
        if self.malformed_json_retries > 10 {
            return Err(ValidationError::TooManyRetries);
        }
        if self.llm_timeout_secs == 0 {
            return Err(ValidationError::InvalidLlmTimeout);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schema_dir: default_schema_dir(),
            default_schema: None,
            transcript_window: default_transcript_window(),
            malformed_json_retries: default_malformed_json_retries(),
            llm_timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_schema_dir() -> PathBuf {
    PathBuf::from("schemas")
}

fn default_transcript_window() -> usize {
    DEFAULT_TRANSCRIPT_WINDOW
}

fn default_malformed_json_retries() -> u32 {
    DEFAULT_MALFORMED_JSON_RETRIES
}

fn default_llm_timeout() -> u64 {
    DEFAULT_LLM_TIMEOUT.as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_defaults() {
        assert_eq!(EngineConfig::default().settings(), EngineSettings::default());
    }

    #[test]
    fn rejects_zero_window_and_timeout() {
        let config = EngineConfig {
            transcript_window: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTranscriptWindow));

        let config = EngineConfig {
            llm_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidLlmTimeout));
    }
}
