use news_feed::config::BackendSettings;
use news_feed::error::NewsError;
use news_feed::services::{NewsClient, NewsSource};
use serde_json::json;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> NewsClient {
    NewsClient::new(&BackendSettings {
        base_url: server.uri(),
        request_timeout_secs: 5,
    })
    .expect("Failed to build client")
}

#[tokio::test]
async fn fetch_news_reads_stored_articles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-news"))
        .and(header_exists("x-request-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "n1",
                "title": "Markets rally",
                "description": "Stocks up",
                "category": ["business"],
                "image": "https://img.example/1.png",
                "url": "https://news.example/1",
                "published": "2024-01-01 10:00:00 +0000"
            },
            {"id": "n2", "title": "Quiet day", "category": "world", "readTime": 2}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let articles = client_for(&server)
        .fetch_news()
        .await
        .expect("Failed to fetch news");

    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].category, vec!["business"]);
    assert_eq!(articles[1].category, vec!["world"]);
    assert_eq!(articles[1].read_time_minutes(), 2);
}

#[tokio::test]
async fn backend_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-news"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_news().await.unwrap_err();
    assert!(matches!(err, NewsError::UnexpectedStatus { status: 500, ref body } if body == "db down"));
}
