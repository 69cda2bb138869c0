use thiserror::Error;

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("News backend returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sign in to save articles")]
    NotSignedIn,

    #[error("Article not found: {0}")]
    UnknownArticle(String),

    #[error("Configuration error: {0}")]
    Config(#[from] service_core::error::AppError),
}
