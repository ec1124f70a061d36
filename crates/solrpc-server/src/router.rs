use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::app_state::AppState;
use crate::handlers;

/// Create the main application router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // MCP SSE transport: stream on GET /sse, requests on POST /messages/
        .route("/sse", get(handlers::mcp_sse))
        .route("/messages", post(handlers::mcp_message))
        .route("/messages/", post(handlers::mcp_message))
        // Streamable HTTP: response returned in the POST body
        .route("/mcp", post(handlers::mcp_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
