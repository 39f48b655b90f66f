//! Resilient streaming inference relay for tarot readings.
//!
//! The relay opens an upstream token stream from a text-generation provider,
//! normalizes its frames, and forwards them to one downstream SSE consumer
//! with liveness supervision and exactly-once termination. After the stream
//! finishes, the accumulated text is formatted into tagged paragraphs, and a
//! validated JSON summary can be requested separately.
//!
//! # Streaming usage (Together.ai)
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mystic_relay::prelude::*;
//! use mystic_relay::vendors::together::TogetherProvider;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), UpstreamError> {
//! let provider = Arc::new(TogetherProvider::from_env()?);
//! let relay = Relay::new(provider);
//!
//! let request = GenerationRequest::new(
//!     "The Moon (intuition), Justice (balance)",
//!     SpreadKind::TwoCard,
//!     "What should I focus on this month?",
//! );
//!
//! let (sink, mut frames) = DownstreamSink::channel(32);
//! tokio::spawn(async move {
//!     while let Some(frame) = frames.recv().await {
//!         // Write each `data: <json>\n\n` frame to the HTTP response.
//!         print!("{}", String::from_utf8_lossy(&frame));
//!     }
//! });
//!
//! let outcome = relay.run(request, sink).await;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

/// Error taxonomy for upstream, summarization, and share operations.
pub mod errors;
/// Paragraph formatting for finished readings.
pub mod format;
/// Downstream SSE frame model and encoding.
pub mod frames;
/// Common imports for typical usage.
pub mod prelude;
/// Prompt templates for readings, summaries, and the repair pass.
pub mod prompt;
/// Provider seam consumed by the relay and the summarizer.
pub mod provider;
/// Request and reading data model.
pub mod reading;
/// The relay itself: orchestration, termination, downstream sink.
pub mod relay;
/// Object-storage and locale collaborator seams.
pub mod share;
/// Normalized upstream stream events.
pub mod stream;
/// Structured summarization with bounded repair.
pub mod summary;
/// Idle supervision for the upstream stream.
pub mod watchdog;
/// Vendor-specific provider integrations.
pub mod vendors;

pub use errors::{ShareError, SummaryError, UpstreamError};
pub use format::format_reading;
pub use frames::DownstreamFrame;
pub use prompt::ReadingPrompt;
pub use provider::{EventStream, ReadingProvider};
pub use reading::{
    CardSummary, FormattedReading, GenerationRequest, Paragraph, ParagraphTag, SpreadKind,
    SummaryArtifact,
};
pub use relay::{CONNECTION_FADED_MESSAGE, DownstreamSink, Relay, RelayConfig, RelayOutcome};
pub use share::{LocaleStrings, ObjectStore, fetch_reading, share_reading};
pub use stream::StreamEvent;
pub use summary::Summarizer;
pub use watchdog::{DEFAULT_CLIENT_IDLE_TIMEOUT, DEFAULT_STREAM_IDLE_TIMEOUT, IdleWatchdog};
