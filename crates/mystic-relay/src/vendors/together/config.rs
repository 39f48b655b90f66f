use std::time::Duration;

use crate::errors::UpstreamError;

use super::transport::Dialect;

/// Configuration for the Together.ai provider client.
///
/// Loaded once at process start and injected into the relay; never read from
/// mutable global state.
#[derive(Clone, Debug)]
pub struct TogetherClientConfig {
    /// API key used for bearer auth.
    pub api_key: String,
    /// Base URL for the Together-compatible endpoint.
    ///
    /// Useful for proxies or local test servers.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Wire dialect for streaming calls; chat is canonical.
    pub dialect: Dialect,
    /// Default HTTP timeout for requests.
    pub timeout: Duration,
    /// Generation cap, in tokens.
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    /// Stop sequences terminating generation.
    pub stop: Vec<String>,
}

impl TogetherClientConfig {
    /// Creates a config with the production defaults and a provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.together.xyz".to_string(),
            model: "meta-llama/Llama-3.3-70B-Instruct-Turbo".to_string(),
            dialect: Dialect::ChatDelta,
            timeout: Duration::from_secs(120),
            max_tokens: 800,
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            stop: vec!["</s>".to_string(), "User:".to_string(), "Assistant:".to_string()],
        }
    }

    /// Builds a config from `TOGETHER_API_KEY`.
    pub fn from_env() -> Result<Self, UpstreamError> {
        let api_key = std::env::var("TOGETHER_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(UpstreamError::config(
                "missing TOGETHER_API_KEY for Together provider",
            ));
        }
        Ok(Self::new(api_key))
    }

    /// Overrides the API base URL (for proxies or test servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the streaming wire dialect.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Overrides the default HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn endpoint_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        match self.dialect {
            Dialect::Completion => format!("{base}/v1/completions"),
            Dialect::ChatDelta => format!("{base}/v1/chat/completions"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_follows_dialect() {
        let config = TogetherClientConfig::new("k");
        assert_eq!(
            config.endpoint_url(),
            "https://api.together.xyz/v1/chat/completions"
        );
        let legacy = TogetherClientConfig::new("k").dialect(Dialect::Completion);
        assert_eq!(
            legacy.endpoint_url(),
            "https://api.together.xyz/v1/completions"
        );
    }

    #[test]
    fn base_url_override_tolerates_trailing_slash() {
        let config = TogetherClientConfig::new("k").base_url("http://localhost:9999/");
        assert_eq!(
            config.endpoint_url(),
            "http://localhost:9999/v1/chat/completions"
        );
    }
}
