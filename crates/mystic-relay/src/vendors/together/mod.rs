//! Together.ai provider integration.
//!
//! Vendor-specific wire handling lives here so the root relay API can remain
//! provider-agnostic: the SSE frame decoder and its two dialects, the paced
//! fallback chunker for buffered responses, and the HTTP adapter.

mod adapter;
pub mod chunker;
mod config;
pub mod transport;

pub use adapter::TogetherProvider;
pub use config::TogetherClientConfig;
pub use transport::{Dialect, FrameDecoder};
