//! service-core: Shared infrastructure for the smartdocs clients.
pub mod capabilities;
pub mod config;
pub mod error;
pub mod observability;

pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
