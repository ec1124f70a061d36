use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive},
    response::{IntoResponse, Response, Sse},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use uuid::Uuid;

use solrpc_mcp::jsonrpc::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
    PROTOCOL_VERSION,
};
use solrpc_mcp::{JsonRpcRequest, JsonRpcResponse};

use crate::app_state::AppState;

/// Query string of the per-session message endpoint.
#[derive(Deserialize)]
pub struct SessionQuery {
    pub session_id: String,
}

/// SSE stream for an MCP client.
///
/// Per the MCP SSE transport:
/// 1. Server sends `event: endpoint` with the session's POST URL
/// 2. Client POSTs JSON-RPC to that URL
/// 3. Server sends responses back via SSE `event: message`
pub async fn mcp_sse(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let (session_id, rx) = state.sessions.open().await;
    tracing::info!("MCP client connected via SSE (session {session_id})");

    let endpoint = format!("/messages/?session_id={}", session_id.simple());
    let init_stream = tokio_stream::once(Ok::<_, Infallible>(
        Event::default().event("endpoint").data(endpoint),
    ));

    let message_stream = ReceiverStream::new(rx).map(|value| {
        Ok::<_, Infallible>(Event::default()
            .event("message")
            .json_data(&value)
            .unwrap_or_else(|_| Event::default().data("error serializing response")))
    });

    Sse::new(init_stream.chain(message_stream)).keep_alive(KeepAlive::default())
}

/// JSON-RPC message posted by an SSE client.
///
/// Accepts immediately with 202; the response is delivered on the session's
/// stream once the call completes.
pub async fn mcp_message(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    body: String,
) -> StatusCode {
    let Ok(session_id) = Uuid::parse_str(&query.session_id) else {
        return StatusCode::BAD_REQUEST;
    };

    if !state.sessions.contains(session_id).await {
        tracing::debug!("Message for unknown session {session_id}");
        return StatusCode::NOT_FOUND;
    }

    tokio::spawn(async move {
        let response = match parse_request(&body) {
            Ok(req) => dispatch(&state, &req).await,
            Err(err) => Some(err),
        };

        if let Some(response) = response {
            let value = serde_json::to_value(&response).unwrap_or_default();
            if !state.sessions.send(session_id, value).await {
                tracing::debug!("Session {session_id} closed before its response was sent");
            }
        }
    });

    StatusCode::ACCEPTED
}

/// Streamable-HTTP style endpoint: the response comes back in the POST body.
pub async fn mcp_request(State(state): State<AppState>, body: String) -> Response {
    let req = match parse_request(&body) {
        Ok(req) => req,
        Err(err) => return Json(err).into_response(),
    };

    match dispatch(&state, &req).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Route one MCP request. Notifications produce no response.
pub async fn dispatch(state: &AppState, req: &JsonRpcRequest) -> Option<JsonRpcResponse> {
    if req.is_notification() {
        tracing::debug!("Received MCP notification: {}", req.method);
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(req),
        "ping" => JsonRpcResponse::success(req.id.clone(), serde_json::json!({})),
        "tools/list" => handle_tools_list(state, req),
        "tools/call" => handle_tools_call(state, req).await,
        _ => JsonRpcResponse::error(req.id.clone(), METHOD_NOT_FOUND, "Method not found"),
    };

    Some(response)
}

fn parse_request(body: &str) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        JsonRpcResponse::error(Value::Null, PARSE_ERROR, format!("Parse error: {e}"))
    })?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let req: JsonRpcRequest = serde_json::from_value(value).map_err(|e| {
        JsonRpcResponse::error(id.clone(), INVALID_REQUEST, format!("Invalid request: {e}"))
    })?;

    if req.jsonrpc != "2.0" {
        return Err(JsonRpcResponse::error(
            id,
            INVALID_REQUEST,
            "Invalid request: jsonrpc must be \"2.0\"",
        ));
    }
    Ok(req)
}

fn handle_initialize(req: &JsonRpcRequest) -> JsonRpcResponse {
    JsonRpcResponse::success(
        req.id.clone(),
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": "solrpc-mcp",
                "version": env!("CARGO_PKG_VERSION")
            }
        }),
    )
}

fn handle_tools_list(state: &AppState, req: &JsonRpcRequest) -> JsonRpcResponse {
    let tools = state.registry.definitions();
    JsonRpcResponse::success(req.id.clone(), serde_json::json!({ "tools": tools }))
}

async fn handle_tools_call(state: &AppState, req: &JsonRpcRequest) -> JsonRpcResponse {
    let Some(params) = &req.params else {
        return JsonRpcResponse::error(req.id.clone(), INVALID_PARAMS, "Missing params");
    };

    let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::error(req.id.clone(), INVALID_PARAMS, "Missing tool name");
    };

    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

    // Upstream failures arrive here as an {"error": ...} value, not an Err.
    let result = match state
        .registry
        .call(state.transport.as_ref(), tool_name, arguments)
        .await
    {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!("Rejected tools/call: {err}");
            return tool_response(req, err.to_string(), true);
        }
    };

    match serde_json::to_string_pretty(&result) {
        Ok(text) => tool_response(req, text, false),
        Err(err) => JsonRpcResponse::error(req.id.clone(), INTERNAL_ERROR, err.to_string()),
    }
}

fn tool_response(req: &JsonRpcRequest, text: String, is_error: bool) -> JsonRpcResponse {
    JsonRpcResponse::success(
        req.id.clone(),
        serde_json::json!({
            "content": [{
                "type": "text",
                "text": text
            }],
            "isError": is_error
        }),
    )
}
