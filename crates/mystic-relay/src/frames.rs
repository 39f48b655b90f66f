use bytes::Bytes;

use crate::reading::FormattedReading;

/// One frame of the downstream SSE wire format.
///
/// Exactly one of the two terminal variants (`Completed`, `Failed`) is ever
/// written per request, always last.
#[derive(Clone, Debug, PartialEq)]
pub enum DownstreamFrame {
    /// Incremental progress; `done: false` on the wire.
    Progress { chunk: String },
    /// Normal completion carrying the formatted reading; `done: true`.
    Completed { reading: FormattedReading },
    /// Terminal failure; `done: true`.
    Failed {
        error: String,
        message: Option<String>,
    },
}

impl DownstreamFrame {
    /// Creates a progress frame.
    pub fn progress(chunk: impl Into<String>) -> Self {
        Self::Progress {
            chunk: chunk.into(),
        }
    }

    /// Creates the terminal completion frame.
    pub fn completed(reading: FormattedReading) -> Self {
        Self::Completed { reading }
    }

    /// Creates a terminal failure frame.
    pub fn failed(error: impl Into<String>, message: Option<String>) -> Self {
        Self::Failed {
            error: error.into(),
            message,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Progress { chunk } => serde_json::json!({ "chunk": chunk, "done": false }),
            Self::Completed { reading } => serde_json::json!({
                "chunk": "",
                "formattedReading": reading,
                "done": true,
            }),
            Self::Failed { error, message } => match message {
                Some(message) => serde_json::json!({
                    "error": error,
                    "message": message,
                    "done": true,
                }),
                None => serde_json::json!({ "error": error, "done": true }),
            },
        }
    }

    /// Encodes the frame as one `data: <json>\n\n` SSE unit.
    pub fn encode(&self) -> Bytes {
        Bytes::from(format!("data: {}\n\n", self.to_json()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::{Paragraph, ParagraphTag};

    fn decode(frame: &DownstreamFrame) -> serde_json::Value {
        let encoded = frame.encode();
        let text = std::str::from_utf8(&encoded).expect("utf8 frame");
        let payload = text
            .strip_prefix("data: ")
            .and_then(|rest| rest.strip_suffix("\n\n"))
            .expect("sse framing");
        serde_json::from_str(payload).expect("frame json")
    }

    #[test]
    fn progress_frame_is_not_done() {
        let value = decode(&DownstreamFrame::progress("The cards"));
        assert_eq!(value["chunk"], "The cards");
        assert_eq!(value["done"], false);
    }

    #[test]
    fn completed_frame_carries_formatted_reading() {
        let reading = FormattedReading {
            paragraphs: vec![Paragraph {
                tag: ParagraphTag::Intro,
                text: "A calm start.".into(),
            }],
        };
        let value = decode(&DownstreamFrame::completed(reading));
        assert_eq!(value["chunk"], "");
        assert_eq!(value["done"], true);
        assert_eq!(value["formattedReading"]["paragraphs"][0]["tag"], "intro");
    }

    #[test]
    fn failed_frame_omits_absent_message() {
        let with = decode(&DownstreamFrame::failed("Stream timeout", Some("faded".into())));
        assert_eq!(with["error"], "Stream timeout");
        assert_eq!(with["message"], "faded");
        assert_eq!(with["done"], true);

        let without = decode(&DownstreamFrame::failed("Stream timeout", None));
        assert!(without.get("message").is_none());
    }
}
