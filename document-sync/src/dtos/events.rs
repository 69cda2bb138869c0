use crate::models::DocumentStatus;
use serde::{Deserialize, Serialize};

/// Event type carrying a per-document status change.
pub const STATUS_UPDATE: &str = "status_update";

/// Raw JSON pushed over the event stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub status: Option<DocumentStatus>,
}

impl PushMessage {
    /// Status delta carried by this message, if it is a complete `status_update`.
    pub fn into_status_event(self) -> Option<StatusEvent> {
        if self.kind != STATUS_UPDATE {
            return None;
        }
        Some(StatusEvent {
            id: self.file_id?,
            status: self.status?,
        })
    }
}

/// Status change for one document delivered by push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub id: String,
    pub status: DocumentStatus,
}
