//! Reconciles the registry against full refreshes, pushed status deltas and
//! resolved details. This is the only writer of the registry.

use crate::dtos::{RemoteDocument, StatusEvent, UploadAck};
use crate::ingest::IngestionReporter;
use crate::models::{Document, DocumentDetail, DocumentStatus};
use crate::registry::{Registry, Snapshot, Upsert};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::{watch, Mutex};

/// What one full refresh did to the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub inserted: usize,
    pub updated: usize,
    /// Records dropped after missing from enough consecutive refreshes.
    pub removed: Vec<String>,
    /// Records that turned `processed` during this refresh and have no summary yet.
    pub needs_detail: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Applied { needs_detail: bool },
    Unchanged,
    /// Status deltas never create records.
    IgnoredUnknown,
    IgnoredRegression,
}

struct SyncState {
    registry: Registry,
    /// Consecutive successful refreshes each record has been absent from.
    missed: HashMap<String, u32>,
}

pub struct StatusSynchronizer {
    state: Mutex<SyncState>,
    snapshots: watch::Receiver<Snapshot>,
    missing_threshold: u32,
}

impl StatusSynchronizer {
    pub fn new(missing_threshold: u32) -> Self {
        let registry = Registry::new();
        let snapshots = registry.subscribe();
        Self {
            state: Mutex::new(SyncState {
                registry,
                missed: HashMap::new(),
            }),
            snapshots,
            missing_threshold: missing_threshold.max(1),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    pub async fn list(&self) -> Snapshot {
        self.state.lock().await.registry.list()
    }

    pub async fn get(&self, id: &str) -> Option<Document> {
        self.state.lock().await.registry.get(id).cloned()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.state.lock().await.registry.contains(id)
    }

    /// Optimistic `pending` entry for an acknowledged upload.
    pub async fn ingest(&self, ack: UploadAck, now: DateTime<Utc>) -> Document {
        let doc = IngestionReporter::report(ack, now);
        let mut state = self.state.lock().await;
        state.missed.remove(&doc.id);
        state.registry.upsert(doc.clone());
        tracing::debug!(document_id = %doc.id, "Registered pending upload");
        state.registry.get(&doc.id).cloned().unwrap_or(doc)
    }

    /// Merge a complete document list.
    ///
    /// Records absent from the list are removed once they have been missing from
    /// `missing_threshold` consecutive refreshes, so a single truncated or empty
    /// response never drops data.
    pub async fn apply_refresh(&self, remote: Vec<RemoteDocument>) -> RefreshReport {
        let mut report = RefreshReport::default();
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let mut seen = HashSet::with_capacity(remote.len());

        for entry in remote {
            let doc = Document::from(entry);
            let id = doc.id.clone();
            state.missed.remove(&id);

            match state.registry.upsert(doc) {
                Upsert::Inserted => report.inserted += 1,
                Upsert::Updated { status_change } => {
                    report.updated += 1;
                    if became_processed(status_change)
                        && state.registry.get(&id).is_some_and(Document::needs_detail)
                    {
                        report.needs_detail.push(id.clone());
                    }
                }
                Upsert::Unchanged => {}
            }
            seen.insert(id);
        }

        for id in state.registry.ids() {
            if seen.contains(&id) {
                continue;
            }
            let misses = state.missed.entry(id.clone()).or_insert(0);
            *misses += 1;
            if *misses >= self.missing_threshold {
                state.missed.remove(&id);
                state.registry.remove(&id);
                tracing::info!(document_id = %id, "Removed document missing from refreshes");
                report.removed.push(id);
            } else {
                tracing::debug!(document_id = %id, misses = *misses, "Document missing from refresh");
            }
        }

        metrics::counter!("document_sync_refresh_total").increment(1);
        report
    }

    /// Apply a pushed status delta to a known record.
    pub async fn apply_push(&self, event: StatusEvent) -> PushOutcome {
        let mut state = self.state.lock().await;

        let current = match state.registry.get(&event.id) {
            Some(doc) => doc.status,
            None => {
                tracing::debug!(document_id = %event.id, "Ignoring status for unknown document");
                metrics::counter!("document_sync_push_total", "outcome" => "unknown").increment(1);
                return PushOutcome::IgnoredUnknown;
            }
        };
        if !current.can_become(event.status) {
            tracing::debug!(
                document_id = %event.id,
                current = %current,
                pushed = %event.status,
                "Ignoring status regression"
            );
            metrics::counter!("document_sync_push_total", "outcome" => "regression").increment(1);
            return PushOutcome::IgnoredRegression;
        }

        let outcome = state
            .registry
            .upsert(Document::status_update(&event.id, event.status));
        match outcome {
            Upsert::Updated { status_change } => {
                tracing::info!(document_id = %event.id, status = %event.status, "Status pushed");
                metrics::counter!("document_sync_push_total", "outcome" => "applied").increment(1);
                let needs_detail = became_processed(status_change)
                    && state
                        .registry
                        .get(&event.id)
                        .is_some_and(Document::needs_detail);
                PushOutcome::Applied { needs_detail }
            }
            _ => PushOutcome::Unchanged,
        }
    }

    /// Store a resolved summary on the record. Returns false when the record is gone.
    pub async fn apply_detail(&self, id: &str, detail: DocumentDetail) -> bool {
        let mut state = self.state.lock().await;
        if !state.registry.contains(id) {
            tracing::debug!(document_id = %id, "Dropping detail for removed document");
            return false;
        }

        let mut update = Document::status_update(id, DocumentStatus::Processed);
        update.summary = Some(detail.summary);
        update.categories = detail.categories;
        state.registry.upsert(update);
        true
    }

    pub async fn remove(&self, id: &str) -> Option<Document> {
        let mut state = self.state.lock().await;
        state.missed.remove(id);
        state.registry.remove(id)
    }

    /// Drop every record; used when the session is torn down.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.missed.clear();
        state.registry.clear();
    }
}

fn became_processed(change: Option<(DocumentStatus, DocumentStatus)>) -> bool {
    matches!(change, Some((_, DocumentStatus::Processed)))
}
