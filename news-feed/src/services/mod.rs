pub mod news_client;
pub mod preferences;
pub mod saved;

pub use news_client::{NewsClient, NewsSource};
pub use preferences::{FilePreferenceStore, InMemoryPreferenceStore, PreferenceStore};
pub use saved::SavedArticleStore;
