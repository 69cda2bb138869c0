pub mod config;
pub mod dtos;
pub mod error;
pub mod ingest;
pub mod models;
pub mod notice;
pub mod registry;
pub mod search;
pub mod services;
pub mod session;
pub mod sync;
pub mod view;

pub use error::SyncError;
pub use session::{DeleteOutcome, DocumentSession};
