use std::collections::VecDeque;
use std::pin::Pin;

use futures::StreamExt as _;
use futures::stream;
use tracing::debug;

use crate::errors::UpstreamError;
use crate::prompt::ReadingPrompt;
use crate::provider::{EventStream, ReadingProvider};
use crate::stream::StreamEvent;

use super::chunker;
use super::config::TogetherClientConfig;
use super::transport::{Dialect, FrameDecoder};

type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static>>;

/// Together.ai provider: the upstream stream reader of the relay.
///
/// Owns the HTTP connection, drives the frame decoder, and exposes a single
/// lazy event sequence per call. When the transport hands back a buffered
/// payload instead of a live stream, the fallback chunker takes over.
#[derive(Debug)]
pub struct TogetherProvider {
    client: reqwest::Client,
    config: TogetherClientConfig,
}

impl TogetherProvider {
    /// Creates a provider from explicit client configuration.
    pub fn new(config: TogetherClientConfig) -> Result<Self, UpstreamError> {
        if config.api_key.trim().is_empty() {
            return Err(UpstreamError::config(
                "Together client config api_key must not be empty",
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpstreamError::config(format!("failed to build Together client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Creates a provider using `TOGETHER_API_KEY`.
    pub fn from_env() -> Result<Self, UpstreamError> {
        Self::new(TogetherClientConfig::from_env()?)
    }

    fn request_body(&self, prompt: &ReadingPrompt, stream: bool) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "top_p": self.config.top_p,
            "top_k": self.config.top_k,
            "stop": self.config.stop,
            "stream": stream,
        });
        match self.config.dialect {
            Dialect::ChatDelta => {
                body["messages"] = serde_json::json!([
                    { "role": "system", "content": prompt.system },
                    { "role": "user", "content": prompt.user },
                ]);
            }
            Dialect::Completion => {
                body["prompt"] =
                    serde_json::Value::String(format!("{}\n\n{}", prompt.system, prompt.user));
            }
        }
        body
    }

    async fn send(
        &self,
        prompt: &ReadingPrompt,
        stream: bool,
    ) -> Result<reqwest::Response, UpstreamError> {
        let response = self
            .client
            .post(self.config.endpoint_url())
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(prompt, stream))
            .send()
            .await
            .map_err(|e| UpstreamError::transport(format!("Together request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(UpstreamError::http(status.as_u16(), body));
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl ReadingProvider for TogetherProvider {
    async fn open_stream(&self, prompt: ReadingPrompt) -> Result<EventStream, UpstreamError> {
        debug!(model = %self.config.model, dialect = ?self.config.dialect, "starting Together stream");
        let response = self.send(&prompt, true).await?;

        // Capability probe: only a live event-stream body supports
        // incremental reads; anything else arrived fully buffered.
        if is_event_stream(response.headers()) {
            Ok(decoded_stream(
                self.config.dialect,
                Box::pin(response.bytes_stream()),
            ))
        } else {
            debug!("upstream returned a buffered payload, using the paced fallback");
            let payload = response
                .text()
                .await
                .map_err(|e| UpstreamError::transport(format!("buffered read failed: {e}")))?;
            Ok(chunker::pseudo_stream(payload, self.config.dialect))
        }
    }

    async fn complete(&self, prompt: ReadingPrompt) -> Result<String, UpstreamError> {
        debug!(model = %self.config.model, "running non-streaming Together completion");
        let response = self.send(&prompt, false).await?;
        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| UpstreamError::transport(format!("invalid completion body: {e}")))?;
        completion_text(&value, self.config.dialect)
            .ok_or_else(|| UpstreamError::transport("completion response carried no text"))
    }
}

fn is_event_stream(headers: &reqwest::header::HeaderMap) -> bool {
    headers
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("text/event-stream"))
}

fn completion_text(value: &serde_json::Value, dialect: Dialect) -> Option<String> {
    let choice = value.get("choices").and_then(|c| c.get(0))?;
    let text = match dialect {
        Dialect::Completion => choice.get("text").and_then(|t| t.as_str()),
        Dialect::ChatDelta => choice
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|t| t.as_str()),
    };
    text.map(|t| t.trim().to_string())
}

/// Pumps raw bytes through the frame decoder as they arrive.
///
/// Emits at most one terminal event: a transport failure mid-stream maps to
/// `Error`, and a body that ends without `[DONE]` maps to `Done`.
fn decoded_stream(dialect: Dialect, bytes_stream: ByteStream) -> EventStream {
    struct State {
        bytes_stream: ByteStream,
        decoder: FrameDecoder,
        pending: VecDeque<StreamEvent>,
        finished: bool,
    }

    Box::pin(stream::unfold(
        State {
            bytes_stream,
            decoder: FrameDecoder::new(dialect),
            pending: VecDeque::new(),
            finished: false,
        },
        |mut state| async move {
            loop {
                if let Some(event) = state.pending.pop_front() {
                    if event.is_terminal() {
                        state.finished = true;
                        state.pending.clear();
                    }
                    return Some((event, state));
                }
                if state.finished {
                    return None;
                }
                match state.bytes_stream.next().await {
                    Some(Ok(chunk)) => {
                        state.pending.extend(state.decoder.push_chunk(&chunk));
                    }
                    Some(Err(err)) => {
                        state.finished = true;
                        return Some((
                            StreamEvent::Error(format!("streaming read failed: {err}")),
                            state,
                        ));
                    }
                    None => {
                        state.finished = true;
                        return Some((StreamEvent::Done, state));
                    }
                }
            }
        },
    ))
}
