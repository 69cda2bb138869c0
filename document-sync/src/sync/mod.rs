pub mod resolver;
pub mod synchronizer;

pub use resolver::{DetailResolver, Resolution, Unavailable, SUMMARY_UNAVAILABLE};
pub use synchronizer::{PushOutcome, RefreshReport, StatusSynchronizer};
