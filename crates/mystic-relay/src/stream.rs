/// Normalized events produced by the frame decoder or the fallback chunker
/// and consumed by the relay.
///
/// Events are ephemeral: the relay accumulates token text but never stores
/// the events themselves. `Error` and `Done` are terminal; nothing follows
/// them on a well-behaved stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental text produced by the provider.
    ///
    /// May be empty when a malformed frame was skipped; an empty token still
    /// proves the upstream connection is alive.
    Token(String),
    /// Terminal upstream failure with a human-readable message.
    Error(String),
    /// Normal end of the upstream stream.
    Done,
}

impl StreamEvent {
    /// Returns true for the two terminal variants.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error(_) | Self::Done)
    }
}
