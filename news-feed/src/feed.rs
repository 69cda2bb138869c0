//! The personalized news feed for whoever is currently signed in.

use crate::config::FeedSettings;
use crate::error::NewsError;
use crate::models::NewsArticle;
use crate::scoring::{self, CategoryScores, TrendingCategory, ALL_CATEGORIES};
use crate::services::{NewsSource, PreferenceStore, SavedArticleStore};
use service_core::capabilities::IdentityProvider;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveToggle {
    Saved,
    Removed,
}

impl SaveToggle {
    pub fn message(&self) -> &'static str {
        match self {
            SaveToggle::Saved => "Saved!",
            SaveToggle::Removed => "Removed from saved articles",
        }
    }
}

pub struct NewsFeed<S: NewsSource, P: PreferenceStore> {
    source: Arc<S>,
    preferences: Arc<P>,
    saved_store: SavedArticleStore,
    auth: watch::Receiver<Option<String>>,
    settings: FeedSettings,
    /// Whether `user`, `saved` and `scores` reflect the identity provider.
    scoped: bool,
    user: Option<String>,
    scores: CategoryScores,
    saved: Vec<NewsArticle>,
    /// Articles in server order.
    fetched: Vec<NewsArticle>,
    articles: Vec<NewsArticle>,
    trending: Vec<TrendingCategory>,
    categories: Vec<String>,
    selected: String,
}

impl<S: NewsSource, P: PreferenceStore> NewsFeed<S, P> {
    pub fn new(
        source: Arc<S>,
        preferences: Arc<P>,
        saved_store: SavedArticleStore,
        identity: &dyn IdentityProvider,
        settings: FeedSettings,
    ) -> Self {
        Self {
            source,
            preferences,
            saved_store,
            auth: identity.on_auth_change(),
            settings,
            scoped: false,
            user: None,
            scores: CategoryScores::default(),
            saved: Vec::new(),
            fetched: Vec::new(),
            articles: Vec::new(),
            trending: Vec::new(),
            categories: vec![ALL_CATEGORIES.to_string()],
            selected: ALL_CATEGORIES.to_string(),
        }
    }

    /// Fetch the latest articles and order them for the current user.
    pub async fn load(&mut self) -> Result<&[NewsArticle], NewsError> {
        self.sync_identity().await?;

        let fetched = self.source.fetch_news().await?;
        tracing::info!(count = fetched.len(), "News loaded");
        self.trending = scoring::trending(&fetched, self.settings.trending_limit);
        self.categories = scoring::category_options(&fetched);
        if !self.categories.contains(&self.selected) {
            self.selected = ALL_CATEGORIES.to_string();
        }
        self.fetched = fetched;
        self.arrange();
        Ok(&self.articles)
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn articles(&self) -> &[NewsArticle] {
        &self.articles
    }

    pub fn trending(&self) -> &[TrendingCategory] {
        &self.trending
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn scores(&self) -> &CategoryScores {
        &self.scores
    }

    pub fn selected_category(&self) -> &str {
        &self.selected
    }

    /// Select a category label; empty or `"all"` clears the filter.
    pub fn select_category(&mut self, label: &str) {
        let label = label.trim();
        self.selected = if label.is_empty() || label.eq_ignore_ascii_case(ALL_CATEGORIES) {
            ALL_CATEGORIES.to_string()
        } else {
            label.to_string()
        };
    }

    /// Articles in the selected category, in feed order.
    pub fn filtered(&self) -> Vec<&NewsArticle> {
        if self.selected == ALL_CATEGORIES {
            return self.articles.iter().collect();
        }
        self.articles
            .iter()
            .filter(|a| a.has_category(&self.selected))
            .collect()
    }

    pub fn is_saved(&self, article_id: &str) -> bool {
        self.saved.iter().any(|a| a.id == article_id)
    }

    /// Bookmark the article, or drop the bookmark if it is already saved.
    ///
    /// Saving counts as interest in the article's categories. Unsaving does not
    /// take interest back, nor does it add any: scores only move on saves and
    /// "read more". A failed save leaves both the saved list and the scores as
    /// they were.
    pub async fn toggle_save(&mut self, article_id: &str) -> Result<SaveToggle, NewsError> {
        self.sync_identity().await?;
        let user_id = self.user.clone().ok_or(NewsError::NotSignedIn)?;

        if let Some(pos) = self.saved.iter().position(|a| a.id == article_id) {
            let mut saved = self.saved.clone();
            saved.remove(pos);
            self.saved_store.store(&user_id, &saved).await?;
            self.saved = saved;
            metrics::counter!("news_feed_unsave_total").increment(1);
            tracing::info!(user_id = %user_id, article_id = %article_id, "Article removed from saved");
            return Ok(SaveToggle::Removed);
        }

        let article = self
            .articles
            .iter()
            .find(|a| a.id == article_id)
            .cloned()
            .ok_or_else(|| NewsError::UnknownArticle(article_id.to_string()))?;

        let mut scores = self.scores.clone();
        scores.bump(&article.category);
        let mut saved = self.saved.clone();
        saved.push(article);

        self.saved_store.store(&user_id, &saved).await?;
        if let Err(e) = self.preferences.save_scores(&user_id, &scores).await {
            tracing::warn!(user_id = %user_id, article_id = %article_id, error = %e, "Failed to save scores, undoing save");
            if let Err(restore) = self.saved_store.store(&user_id, &self.saved).await {
                tracing::error!(user_id = %user_id, error = %restore, "Failed to restore saved articles");
            }
            return Err(e);
        }

        self.saved = saved;
        self.scores = scores;
        metrics::counter!("news_feed_save_total").increment(1);
        tracing::info!(user_id = %user_id, article_id = %article_id, "Article saved");
        Ok(SaveToggle::Saved)
    }

    /// Record interest in the article and return the URL to open.
    pub async fn read_more(&mut self, article_id: &str) -> Result<String, NewsError> {
        self.sync_identity().await?;
        let article = self
            .articles
            .iter()
            .chain(self.saved.iter())
            .find(|a| a.id == article_id)
            .cloned()
            .ok_or_else(|| NewsError::UnknownArticle(article_id.to_string()))?;

        if let Some(user_id) = self.user.clone() {
            let mut scores = self.scores.clone();
            scores.bump(&article.category);
            self.preferences.save_scores(&user_id, &scores).await?;
            self.scores = scores;
        }
        metrics::counter!("news_feed_read_more_total").increment(1);
        Ok(article.url)
    }

    /// The signed-in user's saved articles; empty when signed out.
    pub async fn saved(&mut self) -> Result<&[NewsArticle], NewsError> {
        self.sync_identity().await?;
        Ok(&self.saved)
    }

    /// Remove a saved article. Returns false when it was not saved.
    pub async fn remove_saved(&mut self, article_id: &str) -> Result<bool, NewsError> {
        self.sync_identity().await?;
        let user_id = self.user.clone().ok_or(NewsError::NotSignedIn)?;

        let before = self.saved.len();
        self.saved.retain(|a| a.id != article_id);
        if self.saved.len() == before {
            return Ok(false);
        }
        self.saved_store.store(&user_id, &self.saved).await?;
        Ok(true)
    }

    /// Re-scope saved articles and scores when the signed-in user has changed.
    async fn sync_identity(&mut self) -> Result<(), NewsError> {
        let changed = self.auth.has_changed().unwrap_or(false);
        if self.scoped && !changed {
            return Ok(());
        }
        let user = self.auth.borrow_and_update().clone();
        if self.scoped && user == self.user {
            return Ok(());
        }

        let (saved, scores) = match &user {
            Some(user_id) => (
                self.saved_store.load(user_id).await?,
                self.preferences.load_scores(user_id).await?,
            ),
            None => (Vec::new(), CategoryScores::default()),
        };
        tracing::info!(user_id = ?user, saved = saved.len(), "News feed scoped to user");

        self.saved = saved;
        self.scores = scores;
        self.user = user;
        self.scoped = true;
        self.arrange();
        Ok(())
    }

    /// Ranked by affinity when signed in, server order otherwise.
    fn arrange(&mut self) {
        self.articles = self.fetched.clone();
        if self.user.is_some() {
            self.scores.rank(&mut self.articles);
        }
    }
}
