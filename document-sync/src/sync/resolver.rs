//! Fetches summaries for processed documents and caches them in the registry.
//!
//! Every resolution polls: one request, then up to `max_attempts - 1` more at
//! `poll_interval` while the backend still reports the document as processing.
//! Concurrent resolutions of the same document share a single poll loop.

use crate::config::DetailSettings;
use crate::models::{DocumentDetail, DocumentStatus};
use crate::services::{DocumentBackend, SummaryPoll};
use crate::sync::synchronizer::StatusSynchronizer;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

pub const SUMMARY_UNAVAILABLE: &str = "Summary unavailable";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// Backend kept answering "processing" for every attempt.
    Exhausted { attempts: u32 },
    /// Backend answered with a non-retryable error.
    Failed(String),
    /// The document itself failed processing.
    DocumentFailed,
    /// The document is not (or no longer) in the registry.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Summary was already cached; no request was made.
    Cached(DocumentDetail),
    Fetched(DocumentDetail),
    Unavailable(Unavailable),
    Cancelled,
}

impl Resolution {
    pub fn detail(&self) -> Option<&DocumentDetail> {
        match self {
            Resolution::Cached(detail) | Resolution::Fetched(detail) => Some(detail),
            _ => None,
        }
    }

    /// Message to show for this document, if resolution ended without a summary.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Resolution::Unavailable(_) => Some(SUMMARY_UNAVAILABLE),
            _ => None,
        }
    }
}

enum Slot {
    Leader(watch::Sender<Option<Resolution>>),
    Follower(watch::Receiver<Option<Resolution>>),
}

pub struct DetailResolver<B: DocumentBackend> {
    backend: Arc<B>,
    synchronizer: Arc<StatusSynchronizer>,
    settings: DetailSettings,
    in_flight: Mutex<HashMap<String, watch::Receiver<Option<Resolution>>>>,
}

impl<B: DocumentBackend> DetailResolver<B> {
    pub fn new(
        backend: Arc<B>,
        synchronizer: Arc<StatusSynchronizer>,
        settings: DetailSettings,
    ) -> Self {
        Self {
            backend,
            synchronizer,
            settings,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub async fn is_in_flight(&self, id: &str) -> bool {
        self.in_flight.lock().await.contains_key(id)
    }

    /// Resolve the summary of `id`, stopping early when `cancel` fires.
    ///
    /// A caller that joins a poll already running for the same document waits for
    /// that poll's result. `cancel` only ends this caller's wait: when the leading
    /// caller is cancelled first, a joiner still waiting takes over and polls anew.
    pub async fn resolve(&self, id: &str, cancel: &CancellationToken) -> Resolution {
        loop {
            if let Some(settled) = self.settled(id).await {
                return settled;
            }

            let slot = {
                let mut in_flight = self.in_flight.lock().await;
                match in_flight.get(id) {
                    Some(rx) => Slot::Follower(rx.clone()),
                    None => {
                        let (tx, rx) = watch::channel(None);
                        in_flight.insert(id.to_string(), rx);
                        Slot::Leader(tx)
                    }
                }
            };

            match slot {
                Slot::Follower(mut rx) => {
                    tracing::debug!(document_id = %id, "Joining in-flight detail resolution");
                    let joined = async move {
                        match rx.wait_for(Option::is_some).await {
                            Ok(value) => value.clone(),
                            Err(_) => None,
                        }
                    };
                    let outcome = tokio::select! {
                        _ = cancel.cancelled() => return Resolution::Cancelled,
                        outcome = joined => outcome,
                    };
                    match outcome {
                        Some(resolution) => return resolution,
                        None => {
                            tracing::debug!(document_id = %id, "Leading resolution cancelled, taking over");
                        }
                    }
                }
                Slot::Leader(tx) => {
                    let resolution = self.poll(id, cancel).await;
                    self.in_flight.lock().await.remove(id);
                    // Dropping the sender without a value hands the poll to joiners.
                    if !matches!(resolution, Resolution::Cancelled) {
                        tx.send_replace(Some(resolution.clone()));
                    }
                    return resolution;
                }
            }
        }
    }

    /// Outcome that needs no request: cached summary, failed or missing document.
    async fn settled(&self, id: &str) -> Option<Resolution> {
        let Some(doc) = self.synchronizer.get(id).await else {
            return Some(Resolution::Unavailable(Unavailable::Missing));
        };
        if let Some(summary) = doc.summary.filter(|s| !s.is_empty()) {
            return Some(Resolution::Cached(DocumentDetail {
                summary,
                categories: doc.categories,
            }));
        }
        if doc.status == DocumentStatus::Failed {
            return Some(Resolution::Unavailable(Unavailable::DocumentFailed));
        }
        None
    }

    async fn poll(&self, id: &str, cancel: &CancellationToken) -> Resolution {
        let max_attempts = self.settings.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                if let Some(settled) = self.settled(id).await {
                    return settled;
                }
            }

            let response = tokio::select! {
                _ = cancel.cancelled() => return Resolution::Cancelled,
                response = self.backend.get_summary(id) => response,
            };

            match response {
                Ok(SummaryPoll::Ready(detail)) => {
                    self.synchronizer.apply_detail(id, detail.clone()).await;
                    metrics::counter!("document_sync_detail_total", "outcome" => "fetched")
                        .increment(1);
                    tracing::info!(document_id = %id, attempt, "Summary resolved");
                    return Resolution::Fetched(detail);
                }
                Ok(SummaryPoll::Processing) => {
                    tracing::debug!(document_id = %id, attempt, "Summary not ready yet");
                }
                Err(e) if e.is_transient() => {
                    tracing::warn!(document_id = %id, attempt, error = %e, "Summary request failed, will retry");
                }
                Err(e) => {
                    tracing::warn!(document_id = %id, attempt, error = %e, "Summary request failed");
                    metrics::counter!("document_sync_detail_total", "outcome" => "failed")
                        .increment(1);
                    return Resolution::Unavailable(Unavailable::Failed(e.to_string()));
                }
            }

            if attempt < max_attempts {
                tokio::select! {
                    _ = cancel.cancelled() => return Resolution::Cancelled,
                    _ = tokio::time::sleep(self.settings.poll_interval()) => {}
                }
            }
        }

        tracing::warn!(document_id = %id, attempts = max_attempts, "Summary still unavailable");
        metrics::counter!("document_sync_detail_total", "outcome" => "exhausted").increment(1);
        Resolution::Unavailable(Unavailable::Exhausted {
            attempts: max_attempts,
        })
    }
}
