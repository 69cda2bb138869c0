//! One document-list session: the registry plus the background refresh and
//! push-stream tasks that keep it current, torn down together.

use crate::config::Settings;
use crate::error::SyncError;
use crate::ingest::{validate_selection, UploadFile};
use crate::models::Document;
use crate::notice::{Notice, MSG_DELETE_FAILED, MSG_UPLOAD_FAILED, MSG_UPLOAD_OK};
use crate::registry::Snapshot;
use crate::search::{category_options, DocumentFilter};
use crate::services::DocumentBackend;
use crate::sync::{DetailResolver, PushOutcome, RefreshReport, StatusSynchronizer};
use crate::view::{DetailView, ViewState};
use backoff::backoff::Backoff;
use backoff::ExponentialBackoffBuilder;
use chrono::Utc;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

const NOTICE_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The id was not in the registry; nothing was sent.
    NotPresent,
}

struct Shared<B: DocumentBackend> {
    backend: Arc<B>,
    synchronizer: Arc<StatusSynchronizer>,
    resolver: DetailResolver<B>,
    notices: broadcast::Sender<Notice>,
    settings: Settings,
    /// Token of the open detail view; opening another document cancels it.
    open_view: Mutex<Option<CancellationToken>>,
}

impl<B: DocumentBackend> Shared<B> {
    fn notify(&self, notice: Notice) {
        // No receivers is fine: nobody is watching notices.
        let _ = self.notices.send(notice);
    }
}

pub struct DocumentSession<B: DocumentBackend> {
    shared: Arc<Shared<B>>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl<B: DocumentBackend> DocumentSession<B> {
    /// Session with an empty registry. Nothing runs until [`start`](Self::start).
    pub fn new(backend: Arc<B>, settings: Settings) -> Self {
        let synchronizer = Arc::new(StatusSynchronizer::new(
            settings.sync.missing_refresh_threshold,
        ));
        let resolver = DetailResolver::new(
            Arc::clone(&backend),
            Arc::clone(&synchronizer),
            settings.detail.clone(),
        );
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);

        Self {
            shared: Arc::new(Shared {
                backend,
                synchronizer,
                resolver,
                notices,
                settings,
                open_view: Mutex::new(None),
            }),
            cancel: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    /// Spawn the periodic refresh and the push-stream listener.
    pub fn start(&mut self) {
        if !self.tasks.is_empty() {
            return;
        }
        tracing::info!(
            refresh_interval_ms = self.shared.settings.sync.refresh_interval_ms,
            "Starting document session"
        );

        self.tasks.push(tokio::spawn(run_refresh_loop(
            Arc::clone(&self.shared),
            self.cancel.clone(),
        )));
        self.tasks.push(tokio::spawn(run_push_loop(
            Arc::clone(&self.shared),
            self.cancel.clone(),
        )));
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.synchronizer.subscribe()
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.shared.notices.subscribe()
    }

    /// Registry contents, newest upload first.
    pub async fn documents(&self) -> Snapshot {
        self.shared.synchronizer.list().await
    }

    pub async fn document(&self, id: &str) -> Option<Document> {
        self.shared.synchronizer.get(id).await
    }

    pub async fn search(&self, filter: &DocumentFilter) -> Vec<Document> {
        filter.apply(&self.documents().await)
    }

    pub async fn category_options(&self) -> Vec<String> {
        category_options(&self.documents().await)
    }

    /// Run one full refresh now, outside the schedule.
    pub async fn refresh_now(&self) -> Result<RefreshReport, SyncError> {
        refresh(&self.shared, &self.cancel).await
    }

    /// Upload a single selected file and register it as `pending`.
    pub async fn upload(&self, files: Vec<UploadFile>) -> Result<Document, SyncError> {
        let file = match validate_selection(files, self.shared.settings.upload.max_bytes) {
            Ok(file) => file,
            Err(e) => {
                tracing::info!(reason = %e, "Upload rejected");
                self.shared.notify(Notice::error(e.to_string()));
                return Err(e);
            }
        };

        metrics::counter!("document_sync_upload_total").increment(1);
        match self.shared.backend.upload(&file).await {
            Ok(ack) => {
                let doc = self.shared.synchronizer.ingest(ack, Utc::now()).await;
                self.shared
                    .notify(Notice::info(MSG_UPLOAD_OK).for_document(&doc.id));
                Ok(doc)
            }
            Err(e) => {
                tracing::error!(file_name = %file.name, error = %e, "File upload failed");
                metrics::counter!("document_sync_upload_failed_total").increment(1);
                self.shared.notify(Notice::error(MSG_UPLOAD_FAILED));
                Err(e)
            }
        }
    }

    /// Delete on the backend, then drop the record. A failed call leaves the
    /// registry as it was.
    pub async fn delete(&self, id: &str) -> Result<DeleteOutcome, SyncError> {
        if !self.shared.synchronizer.contains(id).await {
            tracing::debug!(document_id = %id, "Delete of unknown document ignored");
            return Ok(DeleteOutcome::NotPresent);
        }

        match self.shared.backend.delete_file(id).await {
            Ok(()) => {
                self.shared.synchronizer.remove(id).await;
                metrics::counter!("document_sync_delete_total").increment(1);
                tracing::info!(document_id = %id, "Document deleted");
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => {
                tracing::error!(document_id = %id, error = %e, "Delete failed");
                metrics::counter!("document_sync_delete_failed_total").increment(1);
                self.shared
                    .notify(Notice::error(MSG_DELETE_FAILED).for_document(id));
                Err(e)
            }
        }
    }

    /// Open the detail view for `id` and start resolving its summary.
    ///
    /// Only one view is open at a time: opening a document stops the previous
    /// view's poll. Dropping or closing the view stops it too.
    pub async fn open(&self, id: &str) -> Option<DetailView> {
        let doc = self.shared.synchronizer.get(id).await?;
        let token = self.cancel.child_token();
        if let Some(previous) = self.shared.open_view.lock().await.replace(token.clone()) {
            previous.cancel();
        }
        let view = DetailView::new(
            doc.id.clone(),
            self.shared.synchronizer.subscribe(),
            ViewState {
                resolving: !doc.has_summary(),
                resolution: None,
            },
            token.clone(),
        );

        let state = view.state_sender();
        let shared = Arc::clone(&self.shared);
        let id = doc.id;
        tokio::spawn(async move {
            let resolution = shared.resolver.resolve(&id, &token).await;
            state.send_replace(ViewState {
                resolving: false,
                resolution: Some(resolution),
            });
        });

        Some(view)
    }

    /// Stop background work, wait for it to finish and empty the registry.
    pub async fn shutdown(mut self) {
        tracing::info!("Shutting down document session");
        self.cancel.cancel();
        for task in std::mem::take(&mut self.tasks) {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Session task ended abnormally");
            }
        }
        self.shared.synchronizer.clear().await;
    }
}

impl<B: DocumentBackend> Drop for DocumentSession<B> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn refresh<B: DocumentBackend>(
    shared: &Arc<Shared<B>>,
    cancel: &CancellationToken,
) -> Result<RefreshReport, SyncError> {
    let remote = shared.backend.list_files().await?;
    let report = shared.synchronizer.apply_refresh(remote).await;
    tracing::debug!(
        inserted = report.inserted,
        updated = report.updated,
        removed = report.removed.len(),
        "Refresh applied"
    );
    for id in &report.needs_detail {
        spawn_detail(shared, id.clone(), cancel.child_token());
    }
    Ok(report)
}

/// Resolve a freshly processed document in the background; a terminal miss
/// becomes a notice scoped to that document.
fn spawn_detail<B: DocumentBackend>(
    shared: &Arc<Shared<B>>,
    id: String,
    cancel: CancellationToken,
) {
    let shared = Arc::clone(shared);
    tokio::spawn(async move {
        let resolution = shared.resolver.resolve(&id, &cancel).await;
        if let Some(message) = resolution.notice() {
            shared.notify(Notice::error(message).for_document(&id));
        }
    });
}

async fn run_refresh_loop<B: DocumentBackend>(shared: Arc<Shared<B>>, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(shared.settings.sync.refresh_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Refresh loop shutting down");
                break;
            }
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = refresh(&shared, &cancel) => result,
        };
        if let Err(e) = result {
            // Keep the stale registry; the next tick retries.
            metrics::counter!("document_sync_refresh_failed_total").increment(1);
            tracing::warn!(error = %e, transient = e.is_transient(), "Document refresh failed");
        }
    }
}

async fn run_push_loop<B: DocumentBackend>(shared: Arc<Shared<B>>, cancel: CancellationToken) {
    let sync = &shared.settings.sync;
    let mut backoff = ExponentialBackoffBuilder::new()
        .with_initial_interval(sync.stream_reconnect_initial())
        .with_max_interval(sync.stream_reconnect_max())
        .with_max_elapsed_time(None)
        .build();

    loop {
        let connected = tokio::select! {
            _ = cancel.cancelled() => break,
            connected = shared.backend.status_events() => connected,
        };

        match connected {
            Ok(mut events) => {
                backoff.reset();
                loop {
                    let next = tokio::select! {
                        _ = cancel.cancelled() => {
                            tracing::info!("Push listener shutting down");
                            return;
                        }
                        next = events.next() => next,
                    };
                    match next {
                        Some(Ok(event)) => {
                            if let PushOutcome::Applied { needs_detail: true } =
                                shared.synchronizer.apply_push(event.clone()).await
                            {
                                spawn_detail(&shared, event.id, cancel.child_token());
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "Status event stream failed");
                            break;
                        }
                        None => {
                            tracing::info!("Status event stream closed");
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not connect to status event stream");
            }
        }

        let delay = backoff
            .next_backoff()
            .unwrap_or_else(|| sync.stream_reconnect_max());
        tracing::debug!(delay_ms = delay.as_millis() as u64, "Reconnecting to status event stream");
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
