use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Failed to decode backend payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Rejected(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] service_core::error::AppError),
}

impl SyncError {
    /// Transport failures and 5xx responses clear up on their own; the next
    /// scheduled refresh or poll attempt is the retry.
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Http(err) => match err.status() {
                Some(status) => status.is_server_error(),
                None => !err.is_decode() && !err.is_builder(),
            },
            SyncError::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
