use serde::Deserialize;
use service_core::error::AppError;
use service_core::observability::LoggingSettings;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub backend: BackendSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl BackendSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    /// Directory holding saved-article lists and category scores.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedSettings {
    #[serde(default = "default_trending_limit")]
    pub trending_limit: usize,
}

fn default_trending_limit() -> usize {
    5
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            trending_limit: default_trending_limit(),
        }
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    service_core::config::get_configuration::<Settings>("news-feed")
}
