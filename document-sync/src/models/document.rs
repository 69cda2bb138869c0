use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing state reported by the backend.
///
/// `Pending` is the only non-terminal state; a document leaves it exactly once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    #[serde(alias = "processing", alias = "uploading")]
    Pending,
    #[serde(alias = "ready", alias = "completed")]
    Processed,
    #[serde(alias = "error")]
    Failed,
}

impl DocumentStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, DocumentStatus::Pending)
    }

    /// Whether moving from `self` to `next` keeps the status monotonic.
    pub fn can_become(self, next: DocumentStatus) -> bool {
        self == next || self == DocumentStatus::Pending
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Processed => "processed",
            DocumentStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When the document was uploaded, and who said so.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "source", content = "at", rename_all = "lowercase")]
pub enum UploadTime {
    /// Client clock at the moment the upload was acknowledged.
    Optimistic(DateTime<Utc>),
    /// Timestamp stored by the backend.
    Authoritative(DateTime<Utc>),
}

impl UploadTime {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            UploadTime::Optimistic(at) | UploadTime::Authoritative(at) => *at,
        }
    }

    pub fn is_authoritative(&self) -> bool {
        matches!(self, UploadTime::Authoritative(_))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    /// Empty until some source has supplied it.
    pub name: String,
    pub file_type: String,
    pub upload_time: Option<UploadTime>,
    pub status: DocumentStatus,
    /// Ordered, duplicate-free; empty until processed.
    pub categories: Vec<String>,
    pub summary: Option<String>,
}

impl Document {
    pub fn pending(
        id: impl Into<String>,
        name: impl Into<String>,
        file_type: impl Into<String>,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            file_type: file_type.into(),
            upload_time: Some(UploadTime::Optimistic(uploaded_at)),
            status: DocumentStatus::Pending,
            categories: Vec::new(),
            summary: None,
        }
    }

    /// Record carrying only a status; every other field is empty and merges as "no change".
    pub fn status_update(id: impl Into<String>, status: DocumentStatus) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            file_type: String::new(),
            upload_time: None,
            status,
            categories: Vec::new(),
            summary: None,
        }
    }

    pub fn has_summary(&self) -> bool {
        self.summary.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Processed but the summary has not been fetched yet.
    pub fn needs_detail(&self) -> bool {
        self.status == DocumentStatus::Processed && !self.has_summary()
    }

    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        self.upload_time.map(|t| t.at())
    }
}

/// Summary payload for one processed document.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DocumentDetail {
    pub summary: String,
    pub categories: Vec<String>,
}

/// Trim labels, drop blanks and keep the first occurrence of each label.
pub fn normalize_categories<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for label in labels {
        let label = label.as_ref().trim();
        if !label.is_empty() && !out.iter().any(|existing| existing == label) {
            out.push(label.to_string());
        }
    }
    out
}
