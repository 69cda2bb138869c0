#![allow(dead_code)]

use async_trait::async_trait;
use document_sync::config::{BackendSettings, DetailSettings, Settings, SyncSettings, UploadSettings};
use document_sync::dtos::{CategoryValue, RemoteDocument, StatusEvent, UploadAck};
use document_sync::error::SyncError;
use document_sync::ingest::UploadFile;
use document_sync::models::{DocumentDetail, DocumentStatus};
use document_sync::services::{DocumentBackend, StatusEventStream, SummaryPoll};
use futures::StreamExt;
use service_core::observability::LoggingSettings;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

pub const TEST_ID: &str = "abc123";

pub fn test_settings() -> Settings {
    Settings {
        backend: BackendSettings {
            base_url: "http://backend.test".to_string(),
            request_timeout_secs: 5,
        },
        sync: SyncSettings::default(),
        detail: DetailSettings::default(),
        upload: UploadSettings::default(),
        logging: LoggingSettings::default(),
    }
}

pub fn remote(id: &str, status: DocumentStatus) -> RemoteDocument {
    RemoteDocument {
        id: id.to_string(),
        name: format!("{}.pdf", id),
        file_type: "application/pdf".to_string(),
        upload_date: None,
        status,
        categories: Vec::new(),
    }
}

pub fn finance(id: &str) -> RemoteDocument {
    let mut doc = remote(id, DocumentStatus::Processed);
    doc.categories = vec![CategoryValue::Labeled {
        category: "Finance".to_string(),
    }];
    doc
}

pub fn detail(summary: &str) -> DocumentDetail {
    DocumentDetail {
        summary: summary.to_string(),
        categories: vec!["Finance".to_string()],
    }
}

pub fn pdf(name: &str) -> UploadFile {
    UploadFile::new(name, "application/pdf", b"%PDF-1.4".to_vec())
}

/// Scripted answer of the summary endpoint.
#[derive(Clone)]
pub enum SummaryReply {
    Ready(DocumentDetail),
    Processing,
    Status(u16),
}

/// In-process backend with scripted replies and call counters.
pub struct FakeBackend {
    pub files: Mutex<Vec<RemoteDocument>>,
    pub fail_list: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_upload: AtomicBool,
    summaries: Mutex<HashMap<String, VecDeque<SummaryReply>>>,
    push_tx: mpsc::UnboundedSender<StatusEvent>,
    push_rx: Mutex<Option<mpsc::UnboundedReceiver<StatusEvent>>>,
    pub upload_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub summary_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub stream_connects: AtomicUsize,
}

impl Default for FakeBackend {
    fn default() -> Self {
        let (push_tx, push_rx) = mpsc::unbounded_channel();
        Self {
            files: Mutex::new(Vec::new()),
            fail_list: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            fail_upload: AtomicBool::new(false),
            summaries: Mutex::new(HashMap::new()),
            push_tx,
            push_rx: Mutex::new(Some(push_rx)),
            upload_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            summary_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            stream_connects: AtomicUsize::new(0),
        }
    }
}

impl FakeBackend {
    pub fn set_files(&self, files: Vec<RemoteDocument>) {
        *self.files.lock().unwrap() = files;
    }

    /// Queue replies for `id`; once drained the endpoint answers "processing".
    pub fn script_summary(&self, id: &str, replies: Vec<SummaryReply>) {
        self.summaries
            .lock()
            .unwrap()
            .entry(id.to_string())
            .or_default()
            .extend(replies);
    }

    pub fn push(&self, id: &str, status: DocumentStatus) {
        self.push_tx
            .send(StatusEvent {
                id: id.to_string(),
                status,
            })
            .expect("Push channel closed");
    }

    pub fn summaries_requested(&self) -> usize {
        self.summary_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentBackend for FakeBackend {
    async fn upload(&self, file: &UploadFile) -> Result<UploadAck, SyncError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(SyncError::UnexpectedStatus {
                status: 500,
                body: "storage unavailable".to_string(),
            });
        }
        Ok(UploadAck {
            id: TEST_ID.to_string(),
            name: file.name.clone(),
            file_type: file.content_type.clone(),
        })
    }

    async fn list_files(&self) -> Result<Vec<RemoteDocument>, SyncError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(SyncError::UnexpectedStatus {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(self.files.lock().unwrap().clone())
    }

    async fn get_summary(&self, id: &str) -> Result<SummaryPoll, SyncError> {
        self.summary_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .summaries
            .lock()
            .unwrap()
            .get_mut(id)
            .and_then(VecDeque::pop_front)
            .unwrap_or(SummaryReply::Processing);

        match reply {
            SummaryReply::Ready(detail) => Ok(SummaryPoll::Ready(detail)),
            SummaryReply::Processing => Ok(SummaryPoll::Processing),
            SummaryReply::Status(404) => Err(SyncError::NotFound(id.to_string())),
            SummaryReply::Status(status) => Err(SyncError::UnexpectedStatus {
                status,
                body: String::new(),
            }),
        }
    }

    async fn delete_file(&self, id: &str) -> Result<(), SyncError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(SyncError::UnexpectedStatus {
                status: 500,
                body: format!("could not delete {}", id),
            });
        }
        self.files.lock().unwrap().retain(|f| f.id != id);
        Ok(())
    }

    async fn status_events(&self) -> Result<StatusEventStream, SyncError> {
        self.stream_connects.fetch_add(1, Ordering::SeqCst);
        let Some(rx) = self.push_rx.lock().unwrap().take() else {
            return Ok(futures::stream::pending().boxed());
        };
        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (Ok(event), rx))
        });
        Ok(stream.boxed())
    }
}
