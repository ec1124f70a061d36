use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use solrpc_mcp::ToolRegistry;
use solrpc_server::app_state::AppState;
use solrpc_server::config::ServerConfig;
use solrpc_server::session::SessionManager;
use solrpc_transport::HttpTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();

    let transport =
        HttpTransport::new(config.rpc_config()).context("Invalid upstream RPC configuration")?;
    tracing::info!("Forwarding Solana RPC calls to {}", transport.redacted_endpoint());

    let registry = ToolRegistry::solana();
    tracing::info!("Registered {} tools", registry.len());

    let state = AppState::new(registry, Arc::new(transport));
    let sessions = Arc::clone(&state.sessions);
    let app = solrpc_server::router::create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("solrpc server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sessions))
        .await
        .context("Server error")?;

    Ok(())
}

// Open SSE streams would otherwise hold graceful shutdown open forever.
async fn shutdown_signal(sessions: Arc<SessionManager>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
    sessions.close_all().await;
}
