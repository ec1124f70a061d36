use async_trait::async_trait;
use serde_json::Value;

use crate::types::HttpMethod;

/// A single-shot HTTP transport to the upstream RPC endpoint.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Perform one HTTP round trip and return the decoded JSON body.
    ///
    /// Every failure (connect error, timeout, non-2xx status, undecodable
    /// body) is absorbed by the implementation and reported as `None`.
    async fn send(&self, method: HttpMethod, payload: Option<&Value>) -> Option<Value>;
}
