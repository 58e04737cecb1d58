//! File-based Session Store Adapter
//!
//! Stores each session as `<session_id>.json` under a base directory.
//! Writes go to a temporary file first and are renamed into place.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::foundation::SessionId;
use crate::domain::session::SessionState;
use crate::ports::{SessionStore, SessionStoreError};

/// File-based storage for session state.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    base_path: PathBuf,
}

impl FileSessionStore {
    /// Create a new file store rooted at `base_path`.
    ///
    /// The directory is created on first write.
    ///
    /// # Example
    /// ```ignore
    /// let store = FileSessionStore::new("./data/sessions");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn session_path(&self, id: SessionId) -> PathBuf {
        self.base_path.join(format!("{}.json", id))
    }

    fn temp_path(&self, id: SessionId) -> PathBuf {
        self.base_path.join(format!(".{}.json.tmp", id))
    }

    async fn ensure_dir(&self) -> Result<(), SessionStoreError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| SessionStoreError::Io(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, id: SessionId) -> Result<Option<SessionState>, SessionStoreError> {
        let json = match fs::read_to_string(self.session_path(id)).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionStoreError::Io(e.to_string())),
        };

        let state = serde_json::from_str(&json)
            .map_err(|e| SessionStoreError::DeserializationFailed(e.to_string()))?;
        Ok(Some(state))
    }

    async fn save(&self, state: &SessionState) -> Result<(), SessionStoreError> {
        self.ensure_dir().await?;

        let json = serde_json::to_string_pretty(state)
            .map_err(|e| SessionStoreError::SerializationFailed(e.to_string()))?;

        let temp = self.temp_path(state.session_id);
        fs::write(&temp, json)
            .await
            .map_err(|e| SessionStoreError::Io(e.to_string()))?;
        fs::rename(&temp, self.session_path(state.session_id))
            .await
            .map_err(|e| SessionStoreError::Io(e.to_string()))?;

        Ok(())
    }

    async fn exists(&self, id: SessionId) -> Result<bool, SessionStoreError> {
        fs::try_exists(self.session_path(id))
            .await
            .map_err(|e| SessionStoreError::Io(e.to_string()))
    }

    async fn delete(&self, id: SessionId) -> Result<bool, SessionStoreError> {
        match fs::remove_file(self.session_path(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SessionStoreError::Io(e.to_string())),
        }
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        let mut entries = match fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(SessionStoreError::Io(e.to_string())),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SessionStoreError::Io(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                fs::remove_file(&path)
                    .await
                    .map_err(|e| SessionStoreError::Io(e.to_string()))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::FieldValue;
    use crate::domain::schema::FlowSchema;
    use tempfile::TempDir;

    fn state() -> SessionState {
        let schema: FlowSchema = serde_json::from_str(
            r#"{"name":"n","title":"T","topics":[{"id":"a","title":"A","intro":"?"}]}"#,
        )
        .unwrap();
        SessionState::start(&schema).unwrap()
    }

    #[tokio::test]
    async fn round_trips_state_as_json() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("sessions"));
        let mut state = state();
        let topic = state.active_topic_mut().unwrap();
        topic.push_assistant("?");
        topic.push_user("answer");
        topic
            .fields
            .insert("interest".into(), FieldValue::choices(["finance"]));

        store.save(&state).await.unwrap();
        let loaded = store.get(state.session_id).await.unwrap().unwrap();

        assert_eq!(loaded, state);

        let raw = std::fs::read_to_string(
            dir.path()
                .join("sessions")
                .join(format!("{}.json", state.session_id)),
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["activeTopicId"], "a");
        assert_eq!(json["topics"]["a"]["fields"]["interest"][0], "finance");
    }

    #[tokio::test]
    async fn missing_session_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        assert!(store.get(SessionId::new()).await.unwrap().is_none());
        assert!(!store.exists(SessionId::new()).await.unwrap());
    }

    #[tokio::test]
    async fn corrupt_file_is_deserialization_error() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        let id = SessionId::new();
        std::fs::write(dir.path().join(format!("{}.json", id)), "{not json").unwrap();

        let err = store.get(id).await.unwrap_err();
        assert!(matches!(err, SessionStoreError::DeserializationFailed(_)));
    }

    #[tokio::test]
    async fn delete_and_clear_remove_files() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        let first = state();
        let second = state();
        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();

        assert!(store.delete(first.session_id).await.unwrap());
        assert!(!store.delete(first.session_id).await.unwrap());
        assert!(store.exists(second.session_id).await.unwrap());

        store.clear().await.unwrap();
        assert!(!store.exists(second.session_id).await.unwrap());
    }

    #[tokio::test]
    async fn clear_on_missing_directory_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("never-created"));
        store.clear().await.unwrap();
    }
}
