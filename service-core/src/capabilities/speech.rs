use std::sync::Arc;

/// Text-to-speech output.
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, text: &str);
    fn cancel(&self);
}

pub type TranscriptCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Voice input. Recognition runs until the returned handle is stopped or dropped.
pub trait SpeechRecognizer: Send + Sync {
    fn start_listening(&self, on_transcript: TranscriptCallback) -> ListeningHandle;
}

/// Releases the recognizer when stopped or dropped.
pub struct ListeningHandle {
    stop: Option<Box<dyn FnOnce() + Send>>,
}

impl ListeningHandle {
    pub fn new(stop: impl FnOnce() + Send + 'static) -> Self {
        Self {
            stop: Some(Box::new(stop)),
        }
    }

    pub fn stop(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop();
        }
    }
}

impl Drop for ListeningHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ListeningHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListeningHandle")
            .field("active", &self.stop.is_some())
            .finish()
    }
}

/// Headless speech: writes what would be spoken to the log and never hears anything.
#[derive(Debug, Default, Clone)]
pub struct LoggingSpeech;

impl SpeechSynthesizer for LoggingSpeech {
    fn speak(&self, text: &str) {
        tracing::info!(chars = text.len(), text = %text, "Speaking");
    }

    fn cancel(&self) {
        tracing::info!("Speech cancelled");
    }
}

impl SpeechRecognizer for LoggingSpeech {
    fn start_listening(&self, _on_transcript: TranscriptCallback) -> ListeningHandle {
        tracing::info!("Voice recognition unavailable in headless mode");
        ListeningHandle::new(|| tracing::debug!("Voice recognition stopped"))
    }
}
