//! Remote backend configuration.

use anyhow::Context;
use std::time::Duration;

/// Default request timeout when `STOREFRONT_TIMEOUT_MS` is not set.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Backend base URL (e.g. `https://project.example.co`)
    pub base_url: String,

    /// Project API key, sent as the `apikey` header
    pub api_key: String,

    /// Per-session bearer token. When absent the API key doubles as the
    /// bearer credential, which is how anonymous sessions authenticate.
    pub bearer_token: Option<String>,

    /// Request timeout
    pub timeout: Duration,
}

impl RemoteConfig {
    /// Create a config with the default timeout and no session token.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            bearer_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Attach a session bearer token.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from the environment.
    ///
    /// Reads `STOREFRONT_API_URL` and `STOREFRONT_API_KEY` (required),
    /// `STOREFRONT_BEARER_TOKEN` and `STOREFRONT_TIMEOUT_MS` (optional).
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url =
            std::env::var("STOREFRONT_API_URL").context("STOREFRONT_API_URL is not set")?;
        let api_key =
            std::env::var("STOREFRONT_API_KEY").context("STOREFRONT_API_KEY is not set")?;

        let mut config = Self::new(base_url, api_key);

        if let Ok(token) = std::env::var("STOREFRONT_BEARER_TOKEN") {
            config.bearer_token = Some(token);
        }

        if let Ok(ms) = std::env::var("STOREFRONT_TIMEOUT_MS") {
            let ms: u64 = ms
                .parse()
                .context("STOREFRONT_TIMEOUT_MS must be an integer")?;
            config.timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RemoteConfig::new("https://example.test", "anon-key");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.bearer_token.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let config = RemoteConfig::new("https://example.test", "anon-key")
            .with_bearer_token("session-jwt")
            .with_timeout(Duration::from_millis(500));

        assert_eq!(config.bearer_token.as_deref(), Some("session-jwt"));
        assert_eq!(config.timeout, Duration::from_millis(500));
    }
}
