use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use serde_json::Value;

use solrpc_core::error::{ConfigError, Error};
use solrpc_core::traits::RpcTransport;
use solrpc_core::types::HttpMethod;
use solrpc_core::RpcConfig;

/// reqwest-backed transport to a single upstream JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: RpcConfig,
    url: Url,
    redacted: String,
}

impl HttpTransport {
    /// Build a transport for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(config: RpcConfig) -> Result<Self, Error> {
        config.validate()?;
        let url = Url::parse(config.endpoint.trim())
            .map_err(|e| ConfigError::InvalidEndpoint(e.to_string()))?;
        let redacted = redact(&url);

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Transport(e.without_url().to_string()))?;

        Ok(Self {
            client,
            config,
            url,
            redacted,
        })
    }

    #[must_use]
    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// The endpoint as it may appear in logs: `scheme://host[:port]/`, with
    /// `<redacted>` standing in for any userinfo, path, query or fragment.
    #[must_use]
    pub fn redacted_endpoint(&self) -> &str {
        &self.redacted
    }

    /// Perform one round trip and report exactly how it failed.
    ///
    /// A POST with a payload sends it as a JSON body with
    /// `Content-Type: application/json`. GET never sends a body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] when the configured timeout elapses,
    /// [`Error::Status`] for a non-2xx response, [`Error::Decode`] when the
    /// body is not JSON and [`Error::Transport`] for anything else.
    pub async fn try_send(
        &self,
        method: HttpMethod,
        payload: Option<&Value>,
    ) -> Result<Value, Error> {
        let request = match (method, payload) {
            (HttpMethod::Get, _) => self.client.get(self.url.clone()),
            (HttpMethod::Post, Some(body)) => self.client.post(self.url.clone()).json(body),
            (HttpMethod::Post, None) => self.client.post(self.url.clone()),
        };

        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        response.json::<Value>().await.map_err(classify)
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn send(&self, method: HttpMethod, payload: Option<&Value>) -> Option<Value> {
        match self.try_send(method, payload).await {
            Ok(body) => Some(body),
            Err(err) => {
                tracing::warn!("Error making {method} request to {}: {err}", self.redacted);
                None
            }
        }
    }
}

// reqwest errors embed the request URL, and with it any api key.
fn classify(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout
    } else if err.is_decode() {
        Error::Decode(err.without_url().to_string())
    } else {
        Error::Transport(err.without_url().to_string())
    }
}

// Keys show up in userinfo (`user:key@`), in the path (`/solana/<key>`) and in
// the query string (`?api-key=`), so only scheme, host and port survive.
fn redact(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let origin = match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    };

    let hidden = !url.username().is_empty()
        || url.password().is_some()
        || url.path() != "/"
        || url.query().is_some()
        || url.fragment().is_some();
    if hidden {
        format!("{origin}/<redacted>")
    } else {
        format!("{origin}/")
    }
}
