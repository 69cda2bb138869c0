#![allow(dead_code)]

use async_trait::async_trait;
use news_feed::error::NewsError;
use news_feed::models::NewsArticle;
use news_feed::scoring::CategoryScores;
use news_feed::services::{NewsSource, PreferenceStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn article(id: &str, categories: &[&str]) -> NewsArticle {
    NewsArticle {
        id: id.to_string(),
        title: format!("Article {}", id),
        description: String::new(),
        category: categories.iter().map(|c| c.to_string()).collect(),
        image: None,
        source: None,
        author: None,
        url: format!("https://news.example/{}", id),
        published: None,
        sentiment: None,
        read_time: None,
    }
}

/// Serves a fixed article list and counts fetches.
#[derive(Default)]
pub struct FakeSource {
    pub articles: Mutex<Vec<NewsArticle>>,
    pub fetches: AtomicUsize,
}

impl FakeSource {
    pub fn with(articles: Vec<NewsArticle>) -> Self {
        Self {
            articles: Mutex::new(articles),
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl NewsSource for FakeSource {
    async fn fetch_news(&self) -> Result<Vec<NewsArticle>, NewsError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.articles.lock().unwrap().clone())
    }
}

/// Reads empty scores and rejects every write.
#[derive(Default)]
pub struct FailingPreferences;

#[async_trait]
impl PreferenceStore for FailingPreferences {
    async fn load_scores(&self, _user_id: &str) -> Result<CategoryScores, NewsError> {
        Ok(CategoryScores::default())
    }

    async fn save_scores(&self, _user_id: &str, _scores: &CategoryScores) -> Result<(), NewsError> {
        Err(NewsError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "preferences are read-only",
        )))
    }
}
