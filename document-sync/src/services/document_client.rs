//! HTTP client for the document-processing backend.

use crate::config::BackendSettings;
use crate::dtos::{RemoteDocument, SummaryResponse, UploadAck};
use crate::error::SyncError;
use crate::ingest::UploadFile;
use crate::services::backend::{DocumentBackend, StatusEventStream, SummaryPoll};
use crate::services::sse::SseDecoder;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{multipart, Client, Response, StatusCode};
use service_core::observability::TracedClientExt;
use std::collections::VecDeque;
use std::time::Duration;

pub struct DocumentClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl DocumentClient {
    pub fn new(settings: &BackendSettings) -> Result<Self, SyncError> {
        // No overall timeout on the client: the event stream stays open indefinitely.
        let client = Client::builder()
            .connect_timeout(settings.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            request_timeout: settings.request_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turn a non-success response into `UnexpectedStatus`, keeping the body for the log.
async fn ensure_success(response: Response) -> Result<Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(SyncError::UnexpectedStatus {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl DocumentBackend for DocumentClient {
    async fn upload(&self, file: &UploadFile) -> Result<UploadAck, SyncError> {
        let url = self.url("/upload");
        let part = multipart::Part::bytes(file.data.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .traced_post(&url)
            .timeout(self.request_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(file_name = %file.name, error = %e, "Upload request failed");
                e
            })?;

        let ack = ensure_success(response).await?.json::<UploadAck>().await?;
        tracing::info!(document_id = %ack.id, file_name = %ack.name, "Upload acknowledged");
        Ok(ack)
    }

    async fn list_files(&self) -> Result<Vec<RemoteDocument>, SyncError> {
        let response = self
            .client
            .traced_get(&self.url("/files"))
            .timeout(self.request_timeout)
            .send()
            .await?;

        Ok(ensure_success(response)
            .await?
            .json::<Vec<RemoteDocument>>()
            .await?)
    }

    async fn get_summary(&self, id: &str) -> Result<SummaryPoll, SyncError> {
        let response = self
            .client
            .traced_get(&self.url(&format!("/get-summary/{}", id)))
            .timeout(self.request_timeout)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let summary = response.json::<SummaryResponse>().await?;
                Ok(SummaryPoll::Ready(summary.into()))
            }
            StatusCode::NOT_FOUND => Err(SyncError::NotFound(id.to_string())),
            status if status.is_success() => {
                tracing::debug!(document_id = %id, status = %status, "Summary still processing");
                Ok(SummaryPoll::Processing)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(SyncError::UnexpectedStatus {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    async fn delete_file(&self, id: &str) -> Result<(), SyncError> {
        let response = self
            .client
            .traced_delete(&self.url(&format!("/delete-file/{}", id)))
            .timeout(self.request_timeout)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SyncError::NotFound(id.to_string()));
        }
        ensure_success(response).await?;
        Ok(())
    }

    async fn status_events(&self) -> Result<StatusEventStream, SyncError> {
        let response = self
            .client
            .traced_get(&self.url("/sse"))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        let response = ensure_success(response).await?;
        tracing::info!(url = %response.url(), "Connected to status event stream");

        let bytes = response.bytes_stream().boxed();
        let stream = futures::stream::unfold(
            (bytes, SseDecoder::new(), VecDeque::new()),
            |(mut bytes, mut decoder, mut ready)| async move {
                loop {
                    if let Some(event) = ready.pop_front() {
                        return Some((Ok(event), (bytes, decoder, ready)));
                    }
                    match bytes.next().await {
                        Some(Ok(chunk)) => ready.extend(decoder.feed(&chunk)),
                        Some(Err(e)) => {
                            return Some((Err(SyncError::Http(e)), (bytes, decoder, ready)))
                        }
                        None => return None,
                    }
                }
            },
        );

        Ok(stream.boxed())
    }
}
