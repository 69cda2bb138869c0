//! Per-user category scores, stored as one JSON document per user.

use crate::error::NewsError;
use crate::scoring::CategoryScores;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const SCORES_FIELD: &str = "categoryScores";

#[async_trait]
pub trait PreferenceStore: Send + Sync + 'static {
    /// Scores for `user_id`; empty when the user has none yet.
    async fn load_scores(&self, user_id: &str) -> Result<CategoryScores, NewsError>;

    /// Replace the user's scores, leaving the rest of their document intact.
    async fn save_scores(&self, user_id: &str, scores: &CategoryScores) -> Result<(), NewsError>;
}

/// User documents under `<data_dir>/users/<uid>.json`.
pub struct FilePreferenceStore {
    dir: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join("users"),
        }
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", user_id))
    }

    async fn read_document(&self, user_id: &str) -> Result<Map<String, Value>, NewsError> {
        match tokio::fs::read(self.path_for(user_id)).await {
            Ok(bytes) => match serde_json::from_slice::<Value>(&bytes)? {
                Value::Object(map) => Ok(map),
                _ => Ok(Map::new()),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn load_scores(&self, user_id: &str) -> Result<CategoryScores, NewsError> {
        let mut document = self.read_document(user_id).await?;
        match document.remove(SCORES_FIELD) {
            Some(scores) => Ok(serde_json::from_value(scores)?),
            None => Ok(CategoryScores::default()),
        }
    }

    async fn save_scores(&self, user_id: &str, scores: &CategoryScores) -> Result<(), NewsError> {
        let mut document = self.read_document(user_id).await?;
        document.insert(SCORES_FIELD.to_string(), serde_json::to_value(scores)?);

        tokio::fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec_pretty(&Value::Object(document))?;
        tokio::fs::write(self.path_for(user_id), bytes).await?;
        tracing::debug!(user_id = %user_id, "Category scores saved");
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPreferenceStore {
    scores: Mutex<HashMap<String, CategoryScores>>,
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn load_scores(&self, user_id: &str) -> Result<CategoryScores, NewsError> {
        Ok(self
            .scores
            .lock()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_scores(&self, user_id: &str, scores: &CategoryScores) -> Result<(), NewsError> {
        self.scores
            .lock()
            .await
            .insert(user_id.to_string(), scores.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_user_has_no_scores() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path());
        assert!(store.load_scores("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_merges_into_existing_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path());
        tokio::fs::create_dir_all(dir.path().join("users")).await.unwrap();
        tokio::fs::write(
            dir.path().join("users/u1.json"),
            r#"{"displayName":"Ada","categoryScores":{"tech":1}}"#,
        )
        .await
        .unwrap();

        let mut scores = store.load_scores("u1").await.unwrap();
        scores.bump(&["tech", "ai"]);
        store.save_scores("u1", &scores).await.unwrap();

        let raw: Value =
            serde_json::from_slice(&tokio::fs::read(dir.path().join("users/u1.json")).await.unwrap())
                .unwrap();
        assert_eq!(raw["displayName"], "Ada");
        assert_eq!(raw["categoryScores"]["tech"], 2);
        assert_eq!(raw["categoryScores"]["ai"], 1);
    }
}
