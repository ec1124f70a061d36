/// Failure of a single upstream RPC round trip.
///
/// Messages never include the endpoint URL, which may carry an access key.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request timed out")]
    Timeout,

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("failed to decode response body: {0}")]
    Decode(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Invalid RPC configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("endpoint must not be empty")]
    EmptyEndpoint,

    #[error("endpoint must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("endpoint is not a valid URL: {0}")]
    InvalidEndpoint(String),

    #[error("user agent must not be empty")]
    EmptyUserAgent,

    #[error("timeout must be greater than zero")]
    ZeroTimeout,
}
