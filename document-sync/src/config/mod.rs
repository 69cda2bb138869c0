use serde::Deserialize;
use service_core::error::AppError;
use service_core::observability::LoggingSettings;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub backend: BackendSettings,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub detail: DetailSettings,
    #[serde(default)]
    pub upload: UploadSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    /// Base URL of the document-processing backend (e.g. http://localhost:5000).
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
pub struct SyncSettings {
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    /// Consecutive successful refreshes a record must be missing from before it is dropped.
    #[serde(default = "default_missing_refresh_threshold")]
    pub missing_refresh_threshold: u32,
    #[serde(default = "default_stream_reconnect_initial_ms")]
    pub stream_reconnect_initial_ms: u64,
    #[serde(default = "default_stream_reconnect_max_ms")]
    pub stream_reconnect_max_ms: u64,
}

fn default_refresh_interval_ms() -> u64 {
    3_000
}

fn default_missing_refresh_threshold() -> u32 {
    2
}

fn default_stream_reconnect_initial_ms() -> u64 {
    1_000
}

fn default_stream_reconnect_max_ms() -> u64 {
    30_000
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
            missing_refresh_threshold: default_missing_refresh_threshold(),
            stream_reconnect_initial_ms: default_stream_reconnect_initial_ms(),
            stream_reconnect_max_ms: default_stream_reconnect_max_ms(),
        }
    }
}

impl SyncSettings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn stream_reconnect_initial(&self) -> Duration {
        Duration::from_millis(self.stream_reconnect_initial_ms)
    }

    pub fn stream_reconnect_max(&self) -> Duration {
        Duration::from_millis(self.stream_reconnect_max_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DetailSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_max_attempts() -> u32 {
    10
}

impl Default for DetailSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl DetailSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadSettings {
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: u64,
}

fn default_max_upload_bytes() -> u64 {
    25 * 1024 * 1024
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_bytes: default_max_upload_bytes(),
        }
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    service_core::config::get_configuration::<Settings>("document-sync")
}
