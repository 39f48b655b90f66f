use std::pin::Pin;

use crate::errors::UpstreamError;
use crate::prompt::ReadingPrompt;
use crate::stream::StreamEvent;

/// Single-pass lazy sequence of normalized upstream events.
///
/// Dropping the stream cancels the underlying provider connection; no events
/// are emitted after it is dropped.
pub type EventStream = Pin<Box<dyn futures::Stream<Item = StreamEvent> + Send + 'static>>;

/// Seam between the relay and a concrete text-generation provider.
///
/// Fakes implement this in tests; the Together.ai integration lives under
/// `vendors::together`.
#[async_trait::async_trait]
pub trait ReadingProvider: Send + Sync {
    /// Opens a streaming generation call and returns its event sequence.
    ///
    /// HTTP-level failures (missing credential, non-2xx status) are returned
    /// here, before any event flows.
    async fn open_stream(&self, prompt: ReadingPrompt) -> Result<EventStream, UpstreamError>;

    /// Runs a non-streaming generation call and returns the full output text.
    ///
    /// Used by the summarizer; the reading path always streams.
    async fn complete(&self, prompt: ReadingPrompt) -> Result<String, UpstreamError>;
}
