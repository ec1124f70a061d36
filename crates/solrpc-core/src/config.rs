use std::time::Duration;

use crate::error::ConfigError;

/// Public mainnet endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "https://api.mainnet-beta.solana.com";

/// Per-request timeout for upstream calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the upstream Solana JSON-RPC endpoint.
///
/// Providers embed the access key in the query string, the path or the
/// userinfo, so `endpoint` must never be logged as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl RpcConfig {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check the settings before a transport is built from them.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is empty or not http(s), the user
    /// agent is empty, or the timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }

        let scheme = endpoint
            .split_once("://")
            .map_or(endpoint, |(scheme, _)| scheme);
        if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
            return Err(ConfigError::UnsupportedScheme(scheme.to_string()));
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::EmptyUserAgent);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: concat!("solrpc-mcp/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
