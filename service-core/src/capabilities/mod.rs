//! Injected capabilities for services the clients consume but do not own.
//!
//! The identity provider and the speech engine are handed to the components that
//! need them instead of being reached through global state, so reconciliation and
//! feed logic can run against in-process fakes.

pub mod identity;
pub mod speech;

pub use identity::{IdentityProvider, SessionIdentity};
pub use speech::{ListeningHandle, LoggingSpeech, SpeechRecognizer, SpeechSynthesizer, TranscriptCallback};
