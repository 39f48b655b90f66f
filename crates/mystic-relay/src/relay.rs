use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt as _;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::format::format_reading;
use crate::frames::DownstreamFrame;
use crate::prompt;
use crate::provider::ReadingProvider;
use crate::reading::{FormattedReading, GenerationRequest};
use crate::stream::StreamEvent;
use crate::watchdog::{DEFAULT_STREAM_IDLE_TIMEOUT, IdleWatchdog};

/// User-facing message written when the watchdog declares the stream dead.
pub const CONNECTION_FADED_MESSAGE: &str = "The mystical energies have faded. \
The connection was lost while channeling your reading.";

/// Runtime options for one relay instance.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Idle bound between upstream events before the watchdog fires.
    pub idle_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_STREAM_IDLE_TIMEOUT,
        }
    }
}

/// Downstream transport handle: encoded SSE frames flow through a bounded
/// channel whose receiver is held by the HTTP response writer.
///
/// A dropped receiver is the downstream-disconnect notification.
pub struct DownstreamSink {
    tx: mpsc::Sender<Bytes>,
}

impl DownstreamSink {
    /// Wraps an existing frame channel sender.
    pub fn new(tx: mpsc::Sender<Bytes>) -> Self {
        Self { tx }
    }

    /// Creates a bounded sink plus the receiver to drain it from.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    async fn write(&self, frame: DownstreamFrame) -> bool {
        self.tx.send(frame.encode()).await.is_ok()
    }

    async fn closed(&self) {
        self.tx.closed().await;
    }
}

/// Which trigger terminated a relay run.
#[derive(Clone, Debug, PartialEq)]
pub enum RelayOutcome {
    /// Upstream finished; the formatted reading was delivered.
    Completed(FormattedReading),
    /// Upstream failed; one terminal error frame was delivered.
    Failed(String),
    /// The idle watchdog fired.
    TimedOut,
    /// Downstream went away; nothing further was written.
    Disconnected,
}

/// First-writer-wins terminal transition.
///
/// The three termination triggers (upstream terminal event, watchdog expiry,
/// downstream disconnect) are logically concurrent even on a single-threaded
/// runtime, so the flag is an atomic check-and-set rather than a plain bool.
struct TerminationGuard {
    ended: AtomicBool,
}

impl TerminationGuard {
    fn new() -> Self {
        Self {
            ended: AtomicBool::new(false),
        }
    }

    /// Claims the terminal transition; true for exactly one caller.
    fn begin(&self) -> bool {
        self.ended
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn is_terminated(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }
}

/// Bridges one upstream provider stream to one downstream SSE consumer.
///
/// Strictly 1:1 — each `run` call serves a single request and owns all of its
/// mutable state; concurrent requests are independent `run` invocations.
pub struct Relay {
    provider: Arc<dyn ReadingProvider>,
    config: RelayConfig,
}

impl Relay {
    /// Creates a relay with default configuration.
    pub fn new(provider: Arc<dyn ReadingProvider>) -> Self {
        Self::with_config(provider, RelayConfig::default())
    }

    /// Creates a relay with explicit configuration.
    pub fn with_config(provider: Arc<dyn ReadingProvider>, config: RelayConfig) -> Self {
        Self { provider, config }
    }

    /// Runs one request to termination, writing frames to `sink`.
    ///
    /// Exactly one terminal (`done: true`) frame is written per call, no
    /// matter which of the termination triggers wins; after downstream
    /// disconnect nothing is written at all. Returning drops the upstream
    /// event stream, which releases the provider connection.
    pub async fn run(&self, request: GenerationRequest, sink: DownstreamSink) -> RelayOutcome {
        let relay_id = uuid::Uuid::new_v4();
        debug!(relay_id = %relay_id, spread = ?request.spread, "starting reading relay");

        // Initial liveness frame so the client renders immediately.
        if !sink.write(DownstreamFrame::progress("")).await {
            return RelayOutcome::Disconnected;
        }

        let mut events = match self.provider.open_stream(prompt::reading_prompt(&request)).await {
            Ok(events) => events,
            Err(err) => {
                warn!(relay_id = %relay_id, error = %err, "upstream request failed before streaming");
                let _ = sink
                    .write(DownstreamFrame::failed(
                        "Failed to generate reading",
                        Some(err.to_string()),
                    ))
                    .await;
                return RelayOutcome::Failed(err.to_string());
            }
        };

        let guard = TerminationGuard::new();
        let mut accumulated = String::new();
        let mut watchdog = IdleWatchdog::arm(self.config.idle_timeout);

        loop {
            tokio::select! {
                _ = sink.closed() => {
                    guard.begin();
                    watchdog.cancel();
                    debug!(relay_id = %relay_id, "downstream disconnected, cancelling upstream");
                    return RelayOutcome::Disconnected;
                }
                fired = watchdog.expired() => {
                    if fired && guard.begin() {
                        warn!(relay_id = %relay_id, "idle watchdog fired, reading incomplete");
                        let _ = sink
                            .write(DownstreamFrame::failed(
                                "Stream timeout",
                                Some(CONNECTION_FADED_MESSAGE.to_string()),
                            ))
                            .await;
                    }
                    return RelayOutcome::TimedOut;
                }
                event = events.next() => match event {
                    Some(StreamEvent::Token(text)) => {
                        // Every decoded event proves liveness, even an empty
                        // token from a skipped malformed frame.
                        watchdog.reset();
                        if text.is_empty() {
                            continue;
                        }
                        accumulated.push_str(&text);
                        if !guard.is_terminated()
                            && !sink.write(DownstreamFrame::progress(text)).await
                        {
                            guard.begin();
                            watchdog.cancel();
                            return RelayOutcome::Disconnected;
                        }
                    }
                    Some(StreamEvent::Error(message)) => {
                        watchdog.cancel();
                        if guard.begin() {
                            warn!(relay_id = %relay_id, error = %message, "upstream stream error");
                            let _ = sink
                                .write(DownstreamFrame::failed(
                                    "Failed to generate reading",
                                    Some(message.clone()),
                                ))
                                .await;
                        }
                        return RelayOutcome::Failed(message);
                    }
                    Some(StreamEvent::Done) | None => {
                        watchdog.cancel();
                        let reading = format_reading(&accumulated);
                        if guard.begin() {
                            debug!(relay_id = %relay_id, paragraphs = reading.paragraphs.len(), "reading complete");
                            let _ = sink.write(DownstreamFrame::completed(reading.clone())).await;
                        }
                        return RelayOutcome::Completed(reading);
                    }
                }
            }
        }
    }
}
