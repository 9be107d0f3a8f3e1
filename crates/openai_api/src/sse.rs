use serde_json::Value;

use crate::error::parse_in_band_error;
use crate::events::{ChatStreamEvent, FinishReason};

/// Incremental parser for SSE text streams.
///
/// Bytes are buffered until a full frame is available, so multi-byte UTF-8
/// sequences split across network chunks decode correctly.
#[derive(Debug, Default)]
pub struct SseStreamParser {
    buffer: Vec<u8>,
}

impl SseStreamParser {
    /// Feed arbitrary bytes into the parser and drain complete events.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<ChatStreamEvent> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();

        while let Some((split, separator_len)) = find_frame_boundary(&self.buffer) {
            let frame = String::from_utf8_lossy(&self.buffer[..split]).into_owned();
            self.buffer.drain(0..split + separator_len);

            let Some(payload) = extract_data_payload(&frame) else {
                continue;
            };

            if payload == "[DONE]" {
                events.push(ChatStreamEvent::Done);
                continue;
            }

            match serde_json::from_str::<Value>(&payload) {
                Ok(value) => map_events(&value, &mut events),
                Err(error) => {
                    tracing::debug!(%error, "ignoring malformed SSE frame");
                }
            }
        }

        events
    }

    /// Parse a complete SSE payload string in one shot.
    pub fn parse_frames(input: &str) -> Vec<ChatStreamEvent> {
        let mut parser = Self::default();
        parser.feed(input.as_bytes())
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.iter().all(u8::is_ascii_whitespace)
    }
}

fn find_frame_boundary(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = find_subslice(buffer, b"\n\n").map(|index| (index, 2));
    let crlf = find_subslice(buffer, b"\r\n\r\n").map(|index| (index, 4));

    match (lf, crlf) {
        (Some(lf), Some(crlf)) => Some(if crlf.0 <= lf.0 { crlf } else { lf }),
        (lf, crlf) => lf.or(crlf),
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn extract_data_payload(frame: &str) -> Option<String> {
    let data_lines: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect();

    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}

fn map_events(value: &Value, events: &mut Vec<ChatStreamEvent>) {
    if let Some((code, message)) = parse_in_band_error(value) {
        events.push(ChatStreamEvent::Error { code, message });
        return;
    }

    let Some(choice) = value
        .get("choices")
        .and_then(|choices| choices.get(0))
    else {
        return;
    };

    let delta = choice
        .get("delta")
        .and_then(|delta| delta.get("content"))
        .and_then(|content| content.as_str())
        .unwrap_or("");
    if !delta.is_empty() {
        events.push(ChatStreamEvent::ContentDelta {
            delta: delta.to_owned(),
        });
    }

    if let Some(reason) = choice.get("finish_reason").and_then(|reason| reason.as_str()) {
        events.push(ChatStreamEvent::Finished {
            reason: FinishReason::parse(reason),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::SseStreamParser;
    use crate::events::ChatStreamEvent;

    #[test]
    fn parse_sse_frames_incrementally() {
        let mut parser = SseStreamParser::default();
        let mut events = Vec::new();

        events.extend(parser.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel"));
        assert!(events.is_empty());
        events.extend(parser.feed(b"lo\"},\"finish_reason\":null}]}\n\n"));
        assert_eq!(
            events,
            vec![ChatStreamEvent::ContentDelta {
                delta: "Hello".to_string(),
            }]
        );

        events.extend(parser.feed(b"data: [DONE]\n\n"));
        assert_eq!(events.last(), Some(&ChatStreamEvent::Done));
        assert!(parser.is_empty_buffer());
    }

    #[test]
    fn multibyte_characters_split_across_chunks_decode_cleanly() {
        let frame = "data: {\"choices\":[{\"delta\":{\"content\":\"σοφία\"}}]}\n\n".as_bytes();
        let split = frame
            .iter()
            .position(|byte| *byte >= 0x80)
            .expect("frame contains non-ascii bytes")
            + 1;

        let mut parser = SseStreamParser::default();
        let mut events = parser.feed(&frame[..split]);
        events.extend(parser.feed(&frame[split..]));

        assert_eq!(
            events,
            vec![ChatStreamEvent::ContentDelta {
                delta: "σοφία".to_string(),
            }]
        );
    }
}
