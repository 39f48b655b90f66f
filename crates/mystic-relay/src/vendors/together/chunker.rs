use std::time::Duration;

use futures::stream;

use crate::provider::EventStream;
use crate::stream::StreamEvent;

use super::transport::{Dialect, FrameDecoder};

/// Default pseudo-stream slice width, in characters.
pub const DEFAULT_WINDOW_CHARS: usize = 5;

/// Default pacing delay between pseudo-stream slices.
pub const DEFAULT_PACING_DELAY: Duration = Duration::from_millis(50);

/// Turns one fully buffered provider response into an approximation of a
/// live stream.
///
/// Some execution environments hand back the whole payload at once even when
/// streaming was requested, and the payload itself comes in two shapes: the
/// SSE text the provider would have streamed, or a single JSON completion
/// object. SSE-shaped payloads are replayed through the frame decoder;
/// JSON payloads are sliced into paced fixed-size windows.
pub fn pseudo_stream(payload: String, dialect: Dialect) -> EventStream {
    paced_pseudo_stream(payload, dialect, DEFAULT_WINDOW_CHARS, DEFAULT_PACING_DELAY)
}

/// `pseudo_stream` with explicit window width and pacing delay.
pub fn paced_pseudo_stream(
    payload: String,
    dialect: Dialect,
    window_chars: usize,
    pacing: Duration,
) -> EventStream {
    if payload.trim_start().starts_with("data:") || payload.trim_start().starts_with(':') {
        return replay_sse(payload, dialect);
    }

    let windows = match buffered_payload_text(&payload, dialect) {
        Ok(text) => slice_windows(&text, window_chars.max(1)),
        Err(message) => {
            return Box::pin(stream::iter(vec![StreamEvent::Error(message)]));
        }
    };

    struct PacedState {
        windows: std::vec::IntoIter<String>,
        pacing: Duration,
        emitted_any: bool,
        done: bool,
    }

    Box::pin(stream::unfold(
        PacedState {
            windows: windows.into_iter(),
            pacing,
            emitted_any: false,
            done: false,
        },
        |mut state| async move {
            if state.done {
                return None;
            }
            match state.windows.next() {
                Some(window) => {
                    if state.emitted_any {
                        tokio::time::sleep(state.pacing).await;
                    }
                    state.emitted_any = true;
                    Some((StreamEvent::Token(window), state))
                }
                None => {
                    state.done = true;
                    Some((StreamEvent::Done, state))
                }
            }
        },
    ))
}

/// Replays an SSE-shaped buffered payload through the frame decoder,
/// guaranteeing a terminal event even if the payload was truncated.
fn replay_sse(payload: String, dialect: Dialect) -> EventStream {
    let mut decoder = FrameDecoder::new(dialect);
    let mut events = decoder.push_chunk(payload.as_bytes());
    if !events.last().is_some_and(StreamEvent::is_terminal) {
        events.push(StreamEvent::Done);
    }
    Box::pin(stream::iter(events))
}

fn buffered_payload_text(payload: &str, dialect: Dialect) -> Result<String, String> {
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|err| format!("unrecognized buffered upstream payload: {err}"))?;
    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .or_else(|| error.as_str())
            .unwrap_or("upstream error");
        return Err(message.to_string());
    }
    let choice = value.get("choices").and_then(|c| c.get(0));
    let text = match dialect {
        Dialect::Completion => choice.and_then(|c| c.get("text")).and_then(|t| t.as_str()),
        Dialect::ChatDelta => choice
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|t| t.as_str()),
    };
    text.map(ToOwned::to_owned)
        .ok_or_else(|| "buffered upstream payload carried no text".to_string())
}

/// Splits text into fixed-width character windows, never inside a char.
fn slice_windows(text: &str, window_chars: usize) -> Vec<String> {
    let mut windows = Vec::new();
    let mut current = String::new();
    let mut count = 0;
    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == window_chars {
            windows.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        windows.push(current);
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt as _;

    async fn collect(stream: EventStream) -> Vec<StreamEvent> {
        stream.collect().await
    }

    #[tokio::test]
    async fn buffered_chat_payload_is_sliced_and_terminated() {
        let payload =
            r#"{"choices":[{"message":{"content":"abcdefghij"}}]}"#.to_string();
        let events = collect(paced_pseudo_stream(
            payload,
            Dialect::ChatDelta,
            5,
            Duration::ZERO,
        ))
        .await;
        assert_eq!(
            events,
            vec![
                StreamEvent::Token("abcde".into()),
                StreamEvent::Token("fghij".into()),
                StreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn windows_respect_char_boundaries() {
        let payload = r#"{"choices":[{"text":"héllo🌙!"}]}"#.to_string();
        let events = collect(paced_pseudo_stream(
            payload,
            Dialect::Completion,
            5,
            Duration::ZERO,
        ))
        .await;
        assert_eq!(
            events,
            vec![
                StreamEvent::Token("héllo".into()),
                StreamEvent::Token("🌙!".into()),
                StreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn sse_shaped_payload_is_replayed_through_the_decoder() {
        let payload = "data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n\n\
data: [DONE]\n\n"
            .to_string();
        let events = collect(pseudo_stream(payload, Dialect::ChatDelta)).await;
        assert_eq!(
            events,
            vec![StreamEvent::Token("hi".into()), StreamEvent::Done]
        );
    }

    #[tokio::test]
    async fn truncated_sse_payload_still_terminates() {
        let payload = "data: {\"choices\":[{\"text\":\"hi\"}]}\n\n".to_string();
        let events = collect(pseudo_stream(payload, Dialect::Completion)).await;
        assert_eq!(
            events,
            vec![StreamEvent::Token("hi".into()), StreamEvent::Done]
        );
    }

    #[tokio::test]
    async fn unparseable_payload_becomes_a_single_error_event() {
        let events = collect(pseudo_stream("<html>oops</html>".into(), Dialect::ChatDelta)).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], StreamEvent::Error(_)));
    }

    #[tokio::test]
    async fn buffered_error_payload_maps_to_error_event() {
        let payload = r#"{"error":{"message":"invalid api key"}}"#.to_string();
        let events = collect(pseudo_stream(payload, Dialect::Completion)).await;
        assert_eq!(events, vec![StreamEvent::Error("invalid api key".into())]);
    }
}
