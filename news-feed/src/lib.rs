pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod scoring;
pub mod services;
pub mod voice;

pub use error::NewsError;
pub use feed::{NewsFeed, SaveToggle};
