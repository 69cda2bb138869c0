use serde::Serialize;

pub const MSG_UPLOAD_OK: &str = "File uploaded successfully.";
pub const MSG_UPLOAD_FAILED: &str = "File upload failed.";
pub const MSG_DELETE_FAILED: &str = "Failed to delete file.";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// User-visible notification published by a session.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// Set when the notice concerns a single document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            document_id: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            document_id: None,
        }
    }

    pub fn for_document(mut self, id: impl Into<String>) -> Self {
        self.document_id = Some(id.into());
        self
    }
}
