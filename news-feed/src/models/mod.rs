pub mod article;

pub use article::{NewsArticle, Sentiment, DEFAULT_READ_TIME_MINUTES};
