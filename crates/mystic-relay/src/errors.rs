/// Errors raised by the upstream generation provider before or during a call.
///
/// Per-frame decode problems are not represented here: a malformed frame is
/// recovered inside the frame decoder and never escapes it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    /// Missing or invalid client configuration (for example no API key).
    ///
    /// Fatal and surfaced before any stream is opened.
    #[error("config error: {0}")]
    Config(String),
    /// Provider answered with a non-2xx status.
    #[error("upstream HTTP error (status {status}): {body}")]
    Http { status: u16, body: String },
    /// Network or stream I/O failed.
    #[error("transport error: {0}")]
    Transport(String),
}

impl UpstreamError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an HTTP-level error carrying the response status and body.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Creates a transport-level error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

/// Errors returned by the structured summarization step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummaryError {
    /// The provider call itself failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    /// The provider output never became valid JSON of the expected shape,
    /// even after the single bounded repair pass.
    #[error("summary validation failed: {0}")]
    Validation(String),
}

/// Errors returned by the object-storage collaborator glue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShareError {
    /// The backing store rejected or failed the operation.
    #[error("store error: {0}")]
    Store(String),
    /// No stored reading exists under the requested identifier.
    #[error("reading not found: {0}")]
    NotFound(String),
}
