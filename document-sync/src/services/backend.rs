use crate::dtos::{RemoteDocument, StatusEvent, UploadAck};
use crate::error::SyncError;
use crate::ingest::UploadFile;
use crate::models::DocumentDetail;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Push channel of status deltas. The stream ends when the connection drops.
pub type StatusEventStream = BoxStream<'static, Result<StatusEvent, SyncError>>;

/// One answer from the summary endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryPoll {
    Ready(DocumentDetail),
    /// Backend accepted the request but the document is still being processed.
    Processing,
}

/// Request/response contract of the document-processing backend.
#[async_trait]
pub trait DocumentBackend: Send + Sync + 'static {
    async fn upload(&self, file: &UploadFile) -> Result<UploadAck, SyncError>;

    async fn list_files(&self) -> Result<Vec<RemoteDocument>, SyncError>;

    async fn get_summary(&self, id: &str) -> Result<SummaryPoll, SyncError>;

    async fn delete_file(&self, id: &str) -> Result<(), SyncError>;

    async fn status_events(&self) -> Result<StatusEventStream, SyncError>;
}
