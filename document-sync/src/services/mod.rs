pub mod backend;
pub mod document_client;
pub mod sse;

pub use backend::{DocumentBackend, StatusEventStream, SummaryPoll};
pub use document_client::DocumentClient;
pub use sse::SseDecoder;
