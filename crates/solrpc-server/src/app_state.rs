use std::sync::Arc;

use solrpc_core::traits::RpcTransport;
use solrpc_mcp::ToolRegistry;

use crate::session::SessionManager;

/// Shared application state with injected dependencies.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ToolRegistry>,
    pub transport: Arc<dyn RpcTransport>,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    #[must_use]
    pub fn new(registry: ToolRegistry, transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            registry: Arc::new(registry),
            transport,
            sessions: Arc::new(SessionManager::new()),
        }
    }
}
