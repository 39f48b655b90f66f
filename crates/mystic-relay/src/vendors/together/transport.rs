use tracing::warn;

use crate::stream::StreamEvent;

/// Which JSON shape the provider's frames use.
///
/// Fixed per upstream call; the caller knows the dialect in advance because
/// it picked the endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    /// Legacy completion frames: `choices[0].text`.
    Completion,
    /// Chat delta frames: `choices[0].delta.content`.
    ChatDelta,
}

/// Incremental decoder for the provider's `data: <json>\n\n` wire format.
///
/// Chunks may arrive split at arbitrary byte boundaries (including inside a
/// multi-byte character); any trailing partial frame is buffered until the
/// next chunk completes it. After a terminal event the decoder goes inert and
/// ignores any further input.
pub struct FrameDecoder {
    dialect: Dialect,
    buf: Vec<u8>,
    finished: bool,
}

impl FrameDecoder {
    /// Creates a decoder for the given dialect.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            buf: Vec::new(),
            finished: false,
        }
    }

    /// Feeds one raw chunk and returns every event completed by it.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }
        self.buf.extend_from_slice(chunk);
        while let Some((frame_len, delim_len)) = next_frame_boundary(&self.buf) {
            let frame: Vec<u8> = self.buf.drain(..frame_len + delim_len).take(frame_len).collect();
            let Some(payload) = data_payload(&frame) else {
                continue;
            };
            if let Some(event) = map_payload(self.dialect, &payload) {
                let terminal = event.is_terminal();
                events.push(event);
                if terminal {
                    self.finished = true;
                    self.buf.clear();
                    break;
                }
            }
        }
        events
    }
}

/// Finds the next frame separator: returns (frame length, separator length).
fn next_frame_boundary(buf: &[u8]) -> Option<(usize, usize)> {
    for i in 0..buf.len().saturating_sub(1) {
        match &buf[i..] {
            [b'\n', b'\n', ..] => return Some((i, 2)),
            [b'\r', b'\n', b'\r', b'\n', ..] => return Some((i, 4)),
            _ => {}
        }
    }
    None
}

/// Joins the frame's `data:` lines; `None` for comment-only or empty frames.
fn data_payload(frame: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(frame);
    let mut data_lines = Vec::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.trim_start().to_string());
        }
    }
    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}

fn map_payload(dialect: Dialect, payload: &str) -> Option<StreamEvent> {
    if payload == "[DONE]" {
        return Some(StreamEvent::Done);
    }
    let value: serde_json::Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(err) => {
            // A single corrupt frame must not abort an otherwise healthy
            // stream; the empty token still resets the relay's watchdog.
            warn!(error = %err, "skipping malformed upstream frame");
            return Some(StreamEvent::Token(String::new()));
        }
    };
    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .or_else(|| error.as_str())
            .unwrap_or("upstream stream error");
        return Some(StreamEvent::Error(message.to_string()));
    }
    let text = match dialect {
        Dialect::Completion => value
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("text"))
            .and_then(|t| t.as_str()),
        Dialect::ChatDelta => value
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("delta"))
            .and_then(|d| d.get("content"))
            .and_then(|t| t.as_str()),
    };
    Some(StreamEvent::Token(text.unwrap_or_default().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(dialect: Dialect, bytes: &[u8]) -> Vec<StreamEvent> {
        FrameDecoder::new(dialect).push_chunk(bytes)
    }

    const CHAT_STREAM: &[u8] = b"data: {\"choices\":[{\"delta\":{\"content\":\"The \"}}]}\n\n\
data: {\"choices\":[{\"delta\":{\"content\":\"Moon\"}}]}\n\n\
data: [DONE]\n\n";

    #[test]
    fn decodes_chat_delta_frames() {
        let events = decode_all(Dialect::ChatDelta, CHAT_STREAM);
        assert_eq!(
            events,
            vec![
                StreamEvent::Token("The ".into()),
                StreamEvent::Token("Moon".into()),
                StreamEvent::Done,
            ]
        );
    }

    #[test]
    fn decodes_legacy_completion_frames() {
        let stream = b"data: {\"choices\":[{\"text\":\"Justice\"}]}\n\ndata: [DONE]\n\n";
        let events = decode_all(Dialect::Completion, stream);
        assert_eq!(
            events,
            vec![StreamEvent::Token("Justice".into()), StreamEvent::Done]
        );
    }

    #[test]
    fn chunk_boundaries_do_not_change_the_event_sequence() {
        let expected = decode_all(Dialect::ChatDelta, CHAT_STREAM);
        for split in 0..CHAT_STREAM.len() {
            let mut decoder = FrameDecoder::new(Dialect::ChatDelta);
            let mut events = decoder.push_chunk(&CHAT_STREAM[..split]);
            events.extend(decoder.push_chunk(&CHAT_STREAM[split..]));
            assert_eq!(events, expected, "split at byte {split}");
        }
    }

    #[test]
    fn malformed_frame_becomes_empty_token_not_failure() {
        let stream = b"data: {\"choices\":[{\"text\":\"A\"}]}\n\n\
data: {not json at all\n\n\
data: {\"choices\":[{\"text\":\"B\"}]}\n\n\
data: [DONE]\n\n";
        let events = decode_all(Dialect::Completion, stream);
        assert_eq!(
            events,
            vec![
                StreamEvent::Token("A".into()),
                StreamEvent::Token(String::new()),
                StreamEvent::Token("B".into()),
                StreamEvent::Done,
            ]
        );
    }

    #[test]
    fn error_frame_is_terminal_and_later_frames_are_ignored() {
        let stream = b"data: {\"error\":{\"message\":\"quota exceeded\"}}\n\n\
data: {\"choices\":[{\"text\":\"late\"}]}\n\n";
        let mut decoder = FrameDecoder::new(Dialect::Completion);
        let events = decoder.push_chunk(stream);
        assert_eq!(events, vec![StreamEvent::Error("quota exceeded".into())]);
        assert!(decoder.push_chunk(b"data: [DONE]\n\n").is_empty());
    }

    #[test]
    fn string_error_payloads_are_supported() {
        let events = decode_all(Dialect::ChatDelta, b"data: {\"error\":\"bad key\"}\n\n");
        assert_eq!(events, vec![StreamEvent::Error("bad key".into())]);
    }

    #[test]
    fn crlf_separators_and_comment_lines_are_handled() {
        let stream = b": keep-alive\r\n\r\ndata: {\"choices\":[{\"text\":\"ok\"}]}\r\n\r\n";
        let events = decode_all(Dialect::Completion, stream);
        assert_eq!(events, vec![StreamEvent::Token("ok".into())]);
    }

    #[test]
    fn partial_frame_survives_a_multibyte_split() {
        let stream = "data: {\"choices\":[{\"delta\":{\"content\":\"🌙 rises\"}}]}\n\n".as_bytes();
        // Split inside the moon emoji's UTF-8 encoding.
        let split = stream.iter().position(|b| *b > 0x7f).expect("emoji") + 2;
        let mut decoder = FrameDecoder::new(Dialect::ChatDelta);
        assert!(decoder.push_chunk(&stream[..split]).is_empty());
        let events = decoder.push_chunk(&stream[split..]);
        assert_eq!(events, vec![StreamEvent::Token("🌙 rises".into())]);
    }
}
