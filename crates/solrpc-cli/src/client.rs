use reqwest::Client;
use serde_json::Value;

/// Thin client for a solrpc server's `POST /mcp` endpoint.
pub struct McpClient {
    client: Client,
    server_url: String,
}

impl McpClient {
    pub fn new(server_url: &str) -> Self {
        Self {
            client: Client::new(),
            server_url: server_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send one JSON-RPC request and return its `result`.
    pub async fn request(&self, method: &str, params: Value) -> anyhow::Result<Value> {
        tracing::debug!("POST {}/mcp {method}", self.server_url);

        let resp = self
            .client
            .post(format!("{}/mcp", self.server_url))
            .json(&serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": method,
                "params": params,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await?;
            anyhow::bail!("Server returned {status}: {body}");
        }

        let body: Value = resp.json().await?;
        if let Some(error) = body.get("error") {
            anyhow::bail!("{}", serde_json::to_string_pretty(error)?);
        }
        body.get("result")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Response carried neither result nor error"))
    }

    pub async fn list_tools(&self) -> anyhow::Result<Vec<Value>> {
        let result = self.request("tools/list", serde_json::json!({})).await?;
        Ok(result["tools"].as_array().cloned().unwrap_or_default())
    }

    /// Call a tool and decode its text content back into JSON.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> anyhow::Result<Value> {
        let result = self
            .request(
                "tools/call",
                serde_json::json!({ "name": name, "arguments": arguments }),
            )
            .await?;
        Ok(tool_output(&result))
    }
}

/// The first text block of a `tools/call` result, parsed as JSON when it is.
pub fn tool_output(result: &Value) -> Value {
    let text = result["content"][0]["text"].as_str().unwrap_or_default();
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
