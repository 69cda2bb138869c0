//! The selected-document view: at most one open document, mirrored from the registry.

use crate::models::Document;
use crate::registry::Snapshot;
use crate::sync::Resolution;
use service_core::capabilities::SpeechSynthesizer;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub resolving: bool,
    pub resolution: Option<Resolution>,
}

/// What the detail panel renders right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedDocument {
    /// `None` once the record has left the registry.
    pub document: Option<Document>,
    pub resolving: bool,
    pub notice: Option<&'static str>,
}

pub struct DetailView {
    id: String,
    snapshots: watch::Receiver<Snapshot>,
    state_tx: Arc<watch::Sender<ViewState>>,
    state: watch::Receiver<ViewState>,
    cancel: CancellationToken,
    speaking: bool,
}

impl DetailView {
    pub(crate) fn new(
        id: String,
        snapshots: watch::Receiver<Snapshot>,
        initial: ViewState,
        cancel: CancellationToken,
    ) -> Self {
        let (state_tx, state) = watch::channel(initial);
        Self {
            id,
            snapshots,
            state_tx: Arc::new(state_tx),
            state,
            cancel,
            speaking: false,
        }
    }

    /// Handle the resolution task reports into.
    pub(crate) fn state_sender(&self) -> Arc<watch::Sender<ViewState>> {
        Arc::clone(&self.state_tx)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Current record from the registry, so updates from any source show up here.
    pub fn current(&self) -> SelectedDocument {
        let document = self
            .snapshots
            .borrow()
            .iter()
            .find(|doc| doc.id == self.id)
            .cloned();
        let state = self.state.borrow();
        SelectedDocument {
            document,
            resolving: state.resolving,
            notice: state.resolution.as_ref().and_then(Resolution::notice),
        }
    }

    /// Wait for the registry or the resolution state to change.
    /// Returns false when the session behind the view has gone away.
    pub async fn changed(&mut self) -> bool {
        tokio::select! {
            result = self.snapshots.changed() => result.is_ok(),
            result = self.state.changed() => result.is_ok(),
        }
    }

    /// Wait until detail resolution has finished.
    pub async fn wait(&mut self) -> Resolution {
        let resolution = match self.state.wait_for(|state| state.resolution.is_some()).await {
            Ok(state) => state.resolution.clone(),
            Err(_) => None,
        };
        resolution.unwrap_or(Resolution::Cancelled)
    }

    /// Read the summary aloud, or stop reading if already speaking.
    /// Returns whether speech is now playing.
    pub fn toggle_speech(&mut self, speech: &dyn SpeechSynthesizer) -> bool {
        if self.speaking {
            speech.cancel();
            self.speaking = false;
            return false;
        }

        let summary = self
            .current()
            .document
            .and_then(|doc| doc.summary)
            .filter(|s| !s.is_empty());
        if let Some(summary) = summary {
            speech.speak(&summary);
            self.speaking = true;
        }
        self.speaking
    }

    /// Dismiss the view; an unfinished resolution stops polling.
    pub fn close(self) {}
}

impl Drop for DetailView {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
