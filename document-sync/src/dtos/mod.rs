pub mod documents;
pub mod events;

pub use documents::{CategoryValue, RemoteDocument, SummaryResponse, UploadAck};
pub use events::{PushMessage, StatusEvent, STATUS_UPDATE};
