//! Session storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for the file backend
    #[serde(default = "default_session_dir")]
    pub session_dir: PathBuf,
}

/// Where sessions live.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.backend == StorageBackend::File && self.session_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__SESSION_DIR"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            session_dir: default_session_dir(),
        }
    }
}

fn default_session_dir() -> PathBuf {
    PathBuf::from("data/sessions")
}
