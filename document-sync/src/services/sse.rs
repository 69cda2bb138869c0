//! Incremental decoder for the backend's `text/event-stream` push channel.

use crate::dtos::{PushMessage, StatusEvent};

/// Buffers raw bytes and yields status events as complete frames arrive.
///
/// Frames are separated by a blank line. `data:` lines of one frame are joined
/// with newlines before JSON decoding; comment lines and other fields are skipped.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StatusEvent> {
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut events = Vec::new();
        while let Some(end) = find_frame_end(&self.buffer) {
            let frame: Vec<u8> = self.buffer.drain(..end + 2).collect();
            let frame = String::from_utf8_lossy(&frame[..end]);
            if let Some(event) = decode_frame(&frame) {
                events.push(event);
            }
        }
        events
    }
}

fn find_frame_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

fn decode_frame(frame: &str) -> Option<StatusEvent> {
    let data: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
        .collect();
    if data.is_empty() {
        return None;
    }

    let payload = data.join("\n");
    match serde_json::from_str::<PushMessage>(&payload) {
        Ok(message) => message.into_status_event(),
        Err(e) => {
            tracing::debug!(error = %e, payload = %payload, "Skipping undecodable push message");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentStatus;

    #[test]
    fn decodes_status_update() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(
            b"data: {\"type\":\"status_update\",\"file_id\":\"abc123\",\"status\":\"processed\"}\n\n",
        );
        assert_eq!(
            events,
            vec![StatusEvent {
                id: "abc123".to_string(),
                status: DocumentStatus::Processed,
            }]
        );
    }

    #[test]
    fn frames_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder
            .feed(b"data: {\"type\":\"status_update\",\"file_")
            .is_empty());
        let events = decoder.feed(b"id\":\"x\",\"status\":\"failed\"}\r\n\r\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, DocumentStatus::Failed);
    }

    #[test]
    fn ignores_other_event_types_and_comments() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(
            b": keep-alive\n\ndata: {\"type\":\"heartbeat\"}\n\ndata: not json\n\n",
        );
        assert!(events.is_empty());
    }

    #[test]
    fn multiple_frames_in_one_chunk() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(
            b"event: message\ndata: {\"type\":\"status_update\",\"file_id\":\"a\",\"status\":\"processed\"}\n\n\
data: {\"type\":\"status_update\",\"file_id\":\"b\",\"status\":\"pending\"}\n\n",
        );
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
