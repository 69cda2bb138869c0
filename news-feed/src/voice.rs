//! Voice input for the news page.

use service_core::capabilities::{ListeningHandle, SpeechRecognizer, TranscriptCallback};
use std::sync::Arc;
use tokio::sync::watch;

pub struct VoiceControl {
    recognizer: Arc<dyn SpeechRecognizer>,
    transcript: Arc<watch::Sender<String>>,
    listening: Option<ListeningHandle>,
}

impl VoiceControl {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        let (transcript, _) = watch::channel(String::new());
        Self {
            recognizer,
            transcript: Arc::new(transcript),
            listening: None,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening.is_some()
    }

    /// Latest transcript heard; empty until something is recognized.
    pub fn transcript(&self) -> String {
        self.transcript.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.transcript.subscribe()
    }

    pub fn start(&mut self) {
        if self.listening.is_some() {
            return;
        }
        let transcript = Arc::clone(&self.transcript);
        let on_transcript: TranscriptCallback = Arc::new(move |text| {
            transcript.send_replace(text);
        });
        self.listening = Some(self.recognizer.start_listening(on_transcript));
        tracing::debug!("Voice control listening");
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.listening.take() {
            handle.stop();
            tracing::debug!("Voice control stopped");
        }
    }

    /// Returns whether the control is listening afterwards.
    pub fn toggle(&mut self) -> bool {
        if self.is_listening() {
            self.stop();
        } else {
            self.start();
        }
        self.is_listening()
    }
}
