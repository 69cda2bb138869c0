use crate::error::NewsError;
use crate::models::NewsArticle;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Saved-article lists, one `saved-articles-<uid>.json` file per user.
#[derive(Debug, Clone)]
pub struct SavedArticleStore {
    dir: PathBuf,
}

impl SavedArticleStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("saved-articles-{}.json", user_id))
    }

    /// The user's saved articles. A missing or unreadable list starts empty.
    pub async fn load(&self, user_id: &str) -> Result<Vec<NewsArticle>, NewsError> {
        let bytes = match tokio::fs::read(self.path_for(user_id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(articles) => Ok(articles),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Discarding corrupt saved-article list");
                Ok(Vec::new())
            }
        }
    }

    pub async fn store(&self, user_id: &str, articles: &[NewsArticle]) -> Result<(), NewsError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec_pretty(articles)?;
        tokio::fs::write(self.path_for(user_id), bytes).await?;
        Ok(())
    }
}
