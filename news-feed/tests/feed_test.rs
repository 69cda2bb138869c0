mod common;

use common::{article, FailingPreferences, FakeSource};
use news_feed::config::FeedSettings;
use news_feed::services::{
    FilePreferenceStore, InMemoryPreferenceStore, PreferenceStore, SavedArticleStore,
};
use news_feed::{NewsError, NewsFeed, SaveToggle};
use service_core::capabilities::SessionIdentity;
use std::sync::Arc;
use tempfile::TempDir;

fn articles() -> Vec<news_feed::models::NewsArticle> {
    vec![
        article("1", &["world"]),
        article("2", &["tech", "ai"]),
        article("3", &["sports"]),
        article("4", &["tech"]),
    ]
}

struct Fixture {
    dir: TempDir,
    source: Arc<FakeSource>,
    preferences: Arc<InMemoryPreferenceStore>,
    identity: SessionIdentity,
}

impl Fixture {
    fn new(identity: SessionIdentity) -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
            source: Arc::new(FakeSource::with(articles())),
            preferences: Arc::new(InMemoryPreferenceStore::default()),
            identity,
        }
    }

    fn feed(&self) -> NewsFeed<FakeSource, InMemoryPreferenceStore> {
        NewsFeed::new(
            Arc::clone(&self.source),
            Arc::clone(&self.preferences),
            SavedArticleStore::new(self.dir.path()),
            &self.identity,
            FeedSettings::default(),
        )
    }
}

fn ids(articles: &[news_feed::models::NewsArticle]) -> Vec<&str> {
    articles.iter().map(|a| a.id.as_str()).collect()
}

#[tokio::test]
async fn signed_out_feed_keeps_server_order_and_trending() {
    let fixture = Fixture::new(SessionIdentity::signed_out());
    let mut feed = fixture.feed();

    let loaded = feed.load().await.expect("Failed to load");
    assert_eq!(ids(loaded), vec!["1", "2", "3", "4"]);

    assert_eq!(feed.trending()[0].name, "tech");
    assert_eq!(feed.trending()[0].count, 2);
    assert_eq!(feed.categories(), ["all", "world", "tech", "ai", "sports"]);
}

#[tokio::test]
async fn signed_in_feed_is_ranked_by_scores() {
    let fixture = Fixture::new(SessionIdentity::signed_in("u1"));
    let mut scores = news_feed::scoring::CategoryScores::default();
    scores.bump(&["sports", "sports", "tech"]);
    fixture
        .preferences
        .save_scores("u1", &scores)
        .await
        .expect("Failed to seed scores");

    let mut feed = fixture.feed();
    let loaded = feed.load().await.expect("Failed to load");
    assert_eq!(ids(loaded), vec!["3", "2", "4", "1"]);
}

#[tokio::test]
async fn category_filter_narrows_feed() {
    let fixture = Fixture::new(SessionIdentity::signed_out());
    let mut feed = fixture.feed();
    feed.load().await.expect("Failed to load");

    feed.select_category("tech");
    let filtered: Vec<&str> = feed.filtered().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(filtered, vec!["2", "4"]);

    feed.select_category("All");
    assert_eq!(feed.filtered().len(), 4);
}

#[tokio::test]
async fn saving_persists_and_bumps_scores_once() {
    let fixture = Fixture::new(SessionIdentity::signed_in("u1"));
    let mut feed = fixture.feed();
    feed.load().await.expect("Failed to load");

    assert_eq!(feed.toggle_save("2").await.expect("Save failed"), SaveToggle::Saved);
    assert!(feed.is_saved("2"));
    assert!(fixture.dir.path().join("saved-articles-u1.json").exists());

    let scores = fixture.preferences.load_scores("u1").await.unwrap();
    assert_eq!(scores.score_of("tech"), 1);
    assert_eq!(scores.score_of("ai"), 1);

    // Unsaving removes the bookmark without touching scores
    assert_eq!(
        feed.toggle_save("2").await.expect("Unsave failed"),
        SaveToggle::Removed
    );
    assert!(!feed.is_saved("2"));
    let scores = fixture.preferences.load_scores("u1").await.unwrap();
    assert_eq!(scores.score_of("tech"), 1);
}

#[tokio::test]
async fn failed_score_write_undoes_the_save() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let identity = SessionIdentity::signed_in("u1");
    let saved_store = SavedArticleStore::new(dir.path());
    let mut feed = NewsFeed::new(
        Arc::new(FakeSource::with(articles())),
        Arc::new(FailingPreferences),
        saved_store.clone(),
        &identity,
        FeedSettings::default(),
    );
    feed.load().await.expect("Failed to load");

    let err = feed.toggle_save("2").await.unwrap_err();
    assert!(matches!(err, NewsError::Io(_)));
    assert!(!feed.is_saved("2"));
    assert_eq!(feed.scores().score_of("tech"), 0);
    assert!(saved_store
        .load("u1")
        .await
        .expect("Failed to read saved list")
        .is_empty());

    // read more fails the same way and leaves scores alone
    assert!(feed.read_more("3").await.is_err());
    assert_eq!(feed.scores().score_of("sports"), 0);
}

#[tokio::test]
async fn saving_requires_sign_in() {
    let fixture = Fixture::new(SessionIdentity::signed_out());
    let mut feed = fixture.feed();
    feed.load().await.expect("Failed to load");

    let err = feed.toggle_save("1").await.unwrap_err();
    assert!(matches!(err, NewsError::NotSignedIn));
}

#[tokio::test]
async fn read_more_returns_url_and_counts_interest() {
    let fixture = Fixture::new(SessionIdentity::signed_in("u1"));
    let mut feed = fixture.feed();
    feed.load().await.expect("Failed to load");

    let url = feed.read_more("3").await.expect("Read more failed");
    assert_eq!(url, "https://news.example/3");
    assert_eq!(feed.scores().score_of("sports"), 1);

    let err = feed.read_more("missing").await.unwrap_err();
    assert!(matches!(err, NewsError::UnknownArticle(_)));
}

#[tokio::test]
async fn saved_list_follows_the_signed_in_user() {
    let fixture = Fixture::new(SessionIdentity::signed_in("u1"));
    let mut feed = fixture.feed();
    feed.load().await.expect("Failed to load");
    feed.toggle_save("1").await.expect("Save failed");

    fixture.identity.sign_in("u2");
    assert!(feed.saved().await.expect("Failed to list").is_empty());

    fixture.identity.sign_out();
    assert!(feed.saved().await.expect("Failed to list").is_empty());
    assert!(matches!(
        feed.remove_saved("1").await.unwrap_err(),
        NewsError::NotSignedIn
    ));

    fixture.identity.sign_in("u1");
    assert_eq!(ids(feed.saved().await.expect("Failed to list")), vec!["1"]);
    assert!(feed.remove_saved("1").await.expect("Remove failed"));
    assert!(!feed.remove_saved("1").await.expect("Remove failed"));
}

#[tokio::test]
async fn file_store_keeps_scores_across_feeds() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let identity = SessionIdentity::signed_in("u1");
    let source = Arc::new(FakeSource::with(articles()));
    let preferences = Arc::new(FilePreferenceStore::new(dir.path()));

    let mut first = NewsFeed::new(
        Arc::clone(&source),
        Arc::clone(&preferences),
        SavedArticleStore::new(dir.path()),
        &identity,
        FeedSettings::default(),
    );
    first.load().await.expect("Failed to load");
    first.toggle_save("3").await.expect("Save failed");

    let mut second = NewsFeed::new(
        source,
        preferences,
        SavedArticleStore::new(dir.path()),
        &identity,
        FeedSettings::default(),
    );
    let loaded = second.load().await.expect("Failed to load");
    assert_eq!(loaded[0].id, "3");
    assert!(second.is_saved("3"));
}
