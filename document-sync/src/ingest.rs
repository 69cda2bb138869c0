//! Upload validation and the optimistic registry entry for acknowledged uploads.

use crate::dtos::UploadAck;
use crate::error::SyncError;
use crate::models::Document;
use chrono::{DateTime, Utc};
use std::path::Path;

pub const PDF: &str = "application/pdf";
pub const DOC: &str = "application/msword";
pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PPT: &str = "application/vnd.ms-powerpoint";
pub const PPTX: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";

const ACCEPTED_TYPES: [(&str, &str); 5] = [
    ("pdf", PDF),
    ("doc", DOC),
    ("docx", DOCX),
    ("ppt", PPT),
    ("pptx", PPTX),
];

pub const MSG_ONE_FILE: &str = "You can upload only one file at a time.";
pub const MSG_NO_FILE: &str = "Please choose a file.";
pub const MSG_BAD_TYPE: &str = "Please select a valid file (PDF, PPT, PPTX, DOC, DOCX).";

/// A file selected for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Read a file from disk, deriving the content type from its extension.
    pub async fn from_path(path: &Path) -> Result<Self, SyncError> {
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());
        let content_type = content_type_for(&name)
            .unwrap_or("application/octet-stream")
            .to_string();
        Ok(Self::new(name, content_type, data))
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Content type registered for the file's extension, if the extension is accepted.
pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    ACCEPTED_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

pub fn is_accepted(file: &UploadFile) -> bool {
    ACCEPTED_TYPES
        .iter()
        .any(|(_, mime)| file.content_type.eq_ignore_ascii_case(mime))
        || content_type_for(&file.name).is_some()
}

/// Check a selection before anything is sent. Returns the single accepted file.
pub fn validate_selection(
    mut files: Vec<UploadFile>,
    max_bytes: u64,
) -> Result<UploadFile, SyncError> {
    if files.len() > 1 {
        return Err(SyncError::Rejected(MSG_ONE_FILE.to_string()));
    }
    let file = files
        .pop()
        .ok_or_else(|| SyncError::Rejected(MSG_NO_FILE.to_string()))?;

    if !is_accepted(&file) {
        return Err(SyncError::Rejected(MSG_BAD_TYPE.to_string()));
    }
    if file.size() > max_bytes {
        return Err(SyncError::Rejected(format!(
            "{} is too large ({} bytes, limit {} bytes).",
            file.name,
            file.size(),
            max_bytes
        )));
    }
    Ok(file)
}

/// Turns upload acknowledgements into `pending` registry records.
pub struct IngestionReporter;

impl IngestionReporter {
    /// Record stamped with the client clock; a later refresh supplies the stored time.
    pub fn report(ack: UploadAck, now: DateTime<Utc>) -> Document {
        Document::pending(ack.id, ack.name, ack.file_type, now)
    }
}
