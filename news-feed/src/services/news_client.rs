use crate::config::BackendSettings;
use crate::error::NewsError;
use crate::models::NewsArticle;
use async_trait::async_trait;
use reqwest::Client;
use service_core::observability::TracedClientExt;

/// Where the feed's articles come from.
#[async_trait]
pub trait NewsSource: Send + Sync + 'static {
    async fn fetch_news(&self) -> Result<Vec<NewsArticle>, NewsError>;
}

pub struct NewsClient {
    client: Client,
    base_url: String,
}

impl NewsClient {
    pub fn new(settings: &BackendSettings) -> Result<Self, NewsError> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl NewsSource for NewsClient {
    async fn fetch_news(&self) -> Result<Vec<NewsArticle>, NewsError> {
        let url = format!("{}/get-news", self.base_url);
        let response = self.client.traced_get(&url).send().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "News request failed");
            e
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status = %status, "News backend returned an error");
            return Err(NewsError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let articles = response.json::<Vec<NewsArticle>>().await?;
        tracing::debug!(count = articles.len(), "Fetched news");
        Ok(articles)
    }
}
