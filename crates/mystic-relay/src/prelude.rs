//! Common imports for typical relay usage.
//!
//! This module intentionally exports the most frequently used request,
//! relay, and error types so application code needs fewer import lines.
pub use crate::{
    DownstreamFrame, DownstreamSink, FormattedReading, GenerationRequest, Relay, RelayConfig,
    RelayOutcome, SpreadKind, StreamEvent, SummaryArtifact, SummaryError, Summarizer,
    UpstreamError,
};
