//! Server-sent event decoding for streamed Messages API replies

use serde::Deserialize;

/// One `event:`/`data:` block from the stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    pub event: Option<String>,
    pub data: String,
}

/// Bytes buffered for one unterminated event before the stream is abandoned
pub const MAX_PENDING_BYTES: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("event exceeds {limit} bytes without a terminator")]
pub struct OversizedEvent {
    pub limit: usize,
}

/// Incremental decoder; bytes may be split anywhere, including inside UTF-8 sequences
#[derive(Debug)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Prefix of `buffer` already searched for a terminator
    scanned: usize,
    limit: usize,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_limit(MAX_PENDING_BYTES)
    }
}

impl SseDecoder {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            limit,
        }
    }

    /// Feed a chunk and return every event it completed, in order.
    ///
    /// An `Err` entry means the unterminated remainder outgrew the limit;
    /// it is discarded and the stream should be abandoned.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<SseEvent, OversizedEvent>> {
        self.buffer.extend(chunk.iter().filter(|b| **b != b'\r'));

        let mut events = Vec::new();
        loop {
            // Back up one byte so a terminator split across chunks is found
            let from = self.scanned.saturating_sub(1);
            let Some(pos) = self.buffer[from..].windows(2).position(|w| w == b"\n\n") else {
                self.scanned = self.buffer.len();
                break;
            };
            let block: Vec<u8> = self.buffer.drain(..from + pos + 2).collect();
            self.scanned = 0;
            if let Some(event) = parse_block(&String::from_utf8_lossy(&block)) {
                events.push(Ok(event));
            }
        }

        if self.buffer.len() > self.limit {
            self.buffer.clear();
            self.scanned = 0;
            events.push(Err(OversizedEvent { limit: self.limit }));
        }
        events
    }
}

fn parse_block(block: &str) -> Option<SseEvent> {
    let mut event = SseEvent::default();
    let mut data_lines = Vec::new();

    for line in block.lines() {
        if line.starts_with(':') {
            continue;
        }
        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);
        match field {
            "event" => event.event = Some(value.to_string()),
            "data" => data_lines.push(value),
            _ => {}
        }
    }

    if event.event.is_none() && data_lines.is_empty() {
        return None;
    }
    event.data = data_lines.join("\n");
    Some(event)
}

/// What a decoded event means for the reply text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Text(String),
    Stop,
    Error(String),
    Other,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Payload {
    ContentBlockDelta { delta: Delta },
    MessageStop,
    Error { error: ErrorDetail },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Delta {
    TextDelta {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl From<SseEvent> for StreamEvent {
    fn from(event: SseEvent) -> Self {
        match serde_json::from_str::<Payload>(&event.data) {
            Ok(Payload::ContentBlockDelta {
                delta: Delta::TextDelta { text },
            }) => StreamEvent::Text(text),
            Ok(Payload::MessageStop) => StreamEvent::Stop,
            Ok(Payload::Error { error }) => StreamEvent::Error(error.message),
            Ok(_) => StreamEvent::Other,
            Err(_) if event.event.as_deref() == Some("error") => {
                StreamEvent::Error(event.data)
            }
            Err(_) => StreamEvent::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(items: Vec<Result<SseEvent, OversizedEvent>>) -> Vec<SseEvent> {
        items.into_iter().collect::<Result<_, _>>().unwrap()
    }

    const DELTA: &str = "event: content_block_delta\n\
        data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hello\"}}\n\n";

    #[test]
    fn decodes_events_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        let (head, tail) = DELTA.as_bytes().split_at(30);

        assert!(decoder.push(head).is_empty());
        let events = decoded(decoder.push(tail));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event.as_deref(), Some("content_block_delta"));
        assert_eq!(
            StreamEvent::from(events[0].clone()),
            StreamEvent::Text("Hello".into())
        );
    }

    #[test]
    fn handles_crlf_and_multibyte_split() {
        let raw = "event: content_block_delta\r\ndata: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"35 °C\"}}\r\n\r\n";
        let bytes = raw.as_bytes();
        let split = raw.find('°').unwrap() + 1;

        let mut decoder = SseDecoder::default();
        let mut events = decoded(decoder.push(&bytes[..split]));
        events.extend(decoded(decoder.push(&bytes[split..])));
        assert_eq!(
            StreamEvent::from(events.remove(0)),
            StreamEvent::Text("35 °C".into())
        );
    }

    #[test]
    fn maps_stop_error_and_noise() {
        let mut decoder = SseDecoder::default();
        let events = decoded(decoder.push(
            b": keep-alive\n\n\
              event: ping\ndata: {\"type\":\"ping\"}\n\n\
              event: error\ndata: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\n\
              event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n",
        ));
        let mapped: Vec<StreamEvent> = events.into_iter().map(StreamEvent::from).collect();
        assert_eq!(
            mapped,
            vec![
                StreamEvent::Other,
                StreamEvent::Error("Overloaded".into()),
                StreamEvent::Stop,
            ]
        );
    }

    #[test]
    fn finds_terminator_split_between_pushes() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"event: ping\ndata: {}\n").is_empty());
        let events = decoded(decoder.push(b"\nevent: message_stop\n"));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event.as_deref(), Some("ping"));

        let events = decoded(decoder.push(b"data: {\"type\":\"message_stop\"}\n\n"));
        assert_eq!(StreamEvent::from(events[0].clone()), StreamEvent::Stop);
    }

    #[test]
    fn unterminated_event_over_limit_is_rejected() {
        let mut decoder = SseDecoder::with_limit(64);
        let mut items = decoder.push(b"event: ping\ndata: {}\n\n");
        items.extend(decoder.push(&[b'x'; 40]));
        assert_eq!(items.len(), 1);
        assert!(items[0].is_ok());

        let items = decoder.push(&[b'x'; 40]);
        assert_eq!(items, vec![Err(OversizedEvent { limit: 64 })]);

        // The decoder starts clean afterwards
        let events = decoded(decoder.push(b"\n\nevent: ping\ndata: {}\n\n"));
        assert_eq!(events.len(), 1);
    }
}
