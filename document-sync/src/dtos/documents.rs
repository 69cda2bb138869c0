//! Payloads exchanged with the document-processing backend.

use crate::models::{normalize_categories, Document, DocumentDetail, DocumentStatus, UploadTime};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A category label, sent either as `{"category": "Finance"}` or as a bare string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CategoryValue {
    Labeled { category: String },
    Plain(String),
}

impl CategoryValue {
    pub fn label(&self) -> &str {
        match self {
            CategoryValue::Labeled { category } => category,
            CategoryValue::Plain(label) => label,
        }
    }
}

fn labels(values: &[CategoryValue]) -> Vec<String> {
    normalize_categories(values.iter().map(CategoryValue::label))
}

/// Response body of `POST /upload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadAck {
    #[serde(alias = "file_id")]
    pub id: String,
    #[serde(default, alias = "filename")]
    pub name: String,
    #[serde(default, rename = "type", alias = "content_type")]
    pub file_type: String,
}

/// One entry of `GET /files`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteDocument {
    #[serde(alias = "file_id")]
    pub id: String,
    #[serde(default, alias = "filename")]
    pub name: String,
    #[serde(default, rename = "type", alias = "content_type")]
    pub file_type: String,
    #[serde(default, alias = "uploadDate")]
    pub upload_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub categories: Vec<CategoryValue>,
}

impl From<RemoteDocument> for Document {
    fn from(remote: RemoteDocument) -> Self {
        Document {
            categories: labels(&remote.categories),
            id: remote.id,
            name: remote.name,
            file_type: remote.file_type,
            upload_time: remote.upload_date.map(UploadTime::Authoritative),
            status: remote.status,
            summary: None,
        }
    }
}

/// Response body of `GET /get-summary/{id}` once processing has finished.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryResponse {
    pub summary: String,
    #[serde(default)]
    pub categories: Vec<CategoryValue>,
}

impl From<SummaryResponse> for DocumentDetail {
    fn from(response: SummaryResponse) -> Self {
        DocumentDetail {
            categories: labels(&response.categories),
            summary: response.summary,
        }
    }
}
