use std::time::Duration;

use clap::Parser;

use solrpc_core::config::DEFAULT_ENDPOINT;
use solrpc_core::RpcConfig;

/// MCP server exposing Solana JSON-RPC queries as tools.
#[derive(Debug, Clone, Parser)]
#[command(name = "solrpc-server", version)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to
    #[arg(long, env = "SOLRPC_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "SOLRPC_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Upstream Solana JSON-RPC endpoint (may embed an api key)
    #[arg(long, env = "SOLANA_RPC_URL", default_value = DEFAULT_ENDPOINT, hide_env_values = true)]
    pub rpc_url: String,

    /// Per-request timeout for upstream calls, in seconds
    #[arg(long, env = "SOLRPC_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// User-Agent sent upstream
    #[arg(long, env = "SOLRPC_USER_AGENT")]
    pub user_agent: Option<String>,
}

impl ServerConfig {
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Upstream settings, falling back to [`RpcConfig`] defaults.
    #[must_use]
    pub fn rpc_config(&self) -> RpcConfig {
        let config = RpcConfig::new(self.rpc_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs));
        match &self.user_agent {
            Some(user_agent) => config.with_user_agent(user_agent.clone()),
            None => config,
        }
    }
}
