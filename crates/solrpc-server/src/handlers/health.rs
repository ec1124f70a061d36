use axum::{extract::State, Json};
use serde_json::Value;

use crate::app_state::AppState;

/// Liveness probe. Does not contact the upstream endpoint.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "tools": state.registry.len(),
        "sessions": state.sessions.len().await,
    }))
}
