pub mod document;

pub use document::{normalize_categories, Document, DocumentDetail, DocumentStatus, UploadTime};
