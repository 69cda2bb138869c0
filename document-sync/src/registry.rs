//! Client-side cache of document records, keyed by backend identifier.

use crate::models::{Document, DocumentStatus, UploadTime};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::watch;

/// Ordered snapshot handed to subscribers after every change.
pub type Snapshot = Vec<Document>;

/// Result of merging one record into the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated {
        /// `(from, to)` when the merge advanced the processing status.
        status_change: Option<(DocumentStatus, DocumentStatus)>,
    },
    Unchanged,
}

impl Upsert {
    pub fn changed(&self) -> bool {
        !matches!(self, Upsert::Unchanged)
    }
}

pub struct Registry {
    documents: HashMap<String, Document>,
    snapshots: watch::Sender<Snapshot>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        let (snapshots, _) = watch::channel(Vec::new());
        Self {
            documents: HashMap::new(),
            snapshots,
        }
    }

    /// Receiver that sees a fresh ordered snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    /// All records, newest upload first. Records without an upload time sort last.
    pub fn list(&self) -> Snapshot {
        let mut docs: Vec<Document> = self.documents.values().cloned().collect();
        docs.sort_by(newest_first);
        docs
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.documents.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Insert `incoming`, or merge it into the record with the same id.
    ///
    /// Non-empty incoming fields overwrite stored ones. Status only moves forward
    /// out of `pending`. The id never changes, and an upload time only changes when
    /// an authoritative timestamp replaces an optimistic one.
    pub fn upsert(&mut self, incoming: Document) -> Upsert {
        let outcome = match self.documents.get_mut(&incoming.id) {
            Some(existing) => merge(existing, incoming),
            None => {
                self.documents.insert(incoming.id.clone(), incoming);
                Upsert::Inserted
            }
        };

        if outcome.changed() {
            self.notify();
        }
        outcome
    }

    /// Delete the record if present. Missing ids are a no-op.
    pub fn remove(&mut self, id: &str) -> Option<Document> {
        let removed = self.documents.remove(id);
        if removed.is_some() {
            self.notify();
        }
        removed
    }

    pub fn clear(&mut self) {
        if !self.documents.is_empty() {
            self.documents.clear();
            self.notify();
        }
    }

    fn notify(&self) {
        self.snapshots.send_replace(self.list());
    }
}

fn merge(existing: &mut Document, incoming: Document) -> Upsert {
    let incoming_has_summary = incoming.has_summary();
    let mut changed = false;

    if !incoming.name.is_empty() && incoming.name != existing.name {
        existing.name = incoming.name;
        changed = true;
    }

    if !incoming.file_type.is_empty() && incoming.file_type != existing.file_type {
        existing.file_type = incoming.file_type;
        changed = true;
    }

    let replace_time = match (&existing.upload_time, &incoming.upload_time) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(UploadTime::Optimistic(_)), Some(UploadTime::Authoritative(_))) => true,
        (Some(_), Some(_)) => false,
    };
    if replace_time {
        existing.upload_time = incoming.upload_time;
        changed = true;
    }

    let mut status_change = None;
    if incoming.status != existing.status {
        if existing.status.can_become(incoming.status) {
            status_change = Some((existing.status, incoming.status));
            existing.status = incoming.status;
            changed = true;
        } else {
            tracing::debug!(
                document_id = %existing.id,
                current = %existing.status,
                ignored = %incoming.status,
                "Ignoring status regression"
            );
        }
    }

    if !incoming.categories.is_empty() && incoming.categories != existing.categories {
        existing.categories = incoming.categories;
        changed = true;
    }

    if incoming_has_summary && incoming.summary != existing.summary {
        existing.summary = incoming.summary;
        changed = true;
    }

    if changed {
        Upsert::Updated { status_change }
    } else {
        Upsert::Unchanged
    }
}

fn newest_first(a: &Document, b: &Document) -> Ordering {
    match (a.uploaded_at(), b.uploaded_at()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.id.cmp(&b.id))
}
