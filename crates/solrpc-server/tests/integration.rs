use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use solrpc_mcp::ToolRegistry;
use solrpc_server::app_state::AppState;

use mock_transport::MockTransport;

fn build_test_app(transport: MockTransport) -> (TestServer, Arc<MockTransport>) {
    let transport = Arc::new(transport);
    let state = AppState::new(ToolRegistry::solana(), transport.clone());
    let app = solrpc_server::router::create_router(state);
    (TestServer::new(app).unwrap(), transport)
}

fn rpc(method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params
    })
}

fn tool_call(name: &str, arguments: Value) -> Value {
    rpc("tools/call", json!({ "name": name, "arguments": arguments }))
}

/// Decode the JSON text block of a successful `tools/call` response.
fn tool_result(body: &Value) -> Value {
    assert_eq!(body["result"]["isError"], false);
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

#[tokio::test]
async fn health_check() {
    let (server, transport) = build_test_app(MockTransport::failing());

    let resp = server.get("/health").await;

    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["tools"], 14);
    assert_eq!(body["sessions"], 0);
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn mcp_initialize() {
    let (server, _) = build_test_app(MockTransport::failing());

    let resp = server.post("/mcp").json(&rpc("initialize", json!({}))).await;

    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["id"], 1);
    assert_eq!(body["result"]["serverInfo"]["name"], "solrpc-mcp");
    assert_eq!(body["result"]["protocolVersion"], "2024-11-05");
    assert!(body["result"]["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn mcp_ping() {
    let (server, _) = build_test_app(MockTransport::failing());

    let resp = server.post("/mcp").json(&rpc("ping", Value::Null)).await;

    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["result"], json!({}));
}

#[tokio::test]
async fn mcp_tools_list() {
    let (server, _) = build_test_app(MockTransport::failing());

    let resp = server.post("/mcp").json(&rpc("tools/list", json!({}))).await;

    resp.assert_status_ok();
    let body: Value = resp.json();
    let tools = body["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 14);
    assert!(tools
        .iter()
        .all(|t| t["inputSchema"]["type"] == "object" && t["description"].is_string()));
}

#[tokio::test]
async fn balance_tool_end_to_end() {
    let reply = json!({"jsonrpc": "2.0", "result": {"value": 123_456}, "id": 1});
    let (server, transport) = build_test_app(MockTransport::replying(reply.clone()));

    let resp = server
        .post("/mcp")
        .json(&tool_call("get_account_balance", json!({ "address": "4Nd1m...XYZ" })))
        .await;

    resp.assert_status_ok();
    assert_eq!(tool_result(&resp.json::<Value>()), reply);
    assert_eq!(
        transport.sent(),
        vec![json!({"jsonrpc": "2.0", "method": "getBalance", "params": ["4Nd1m...XYZ"], "id": 1})]
    );
}

#[tokio::test]
async fn transport_failure_is_a_normal_result() {
    let (server, _) = build_test_app(MockTransport::failing());

    let resp = server
        .post("/mcp")
        .json(&tool_call("get_slot", json!({})))
        .await;

    resp.assert_status_ok();
    let body: Value = resp.json();
    assert!(body.get("error").is_none());
    assert_eq!(tool_result(&body), json!({ "error": "Failed to fetch current slot" }));
}

#[tokio::test]
async fn upstream_rpc_error_is_passed_through() {
    let reply = json!({
        "jsonrpc": "2.0",
        "error": { "code": -32602, "message": "Invalid param: WrongSize" },
        "id": 1
    });
    let (server, _) = build_test_app(MockTransport::replying(reply.clone()));

    let resp = server
        .post("/mcp")
        .json(&tool_call("get_stake_activation", json!({ "stake_account": "S1" })))
        .await;

    assert_eq!(tool_result(&resp.json::<Value>()), reply);
}

#[tokio::test]
async fn get_blocks_without_end_slot() {
    let (server, transport) = build_test_app(MockTransport::replying(json!({"result": [5, 6]})));

    server
        .post("/mcp")
        .json(&tool_call("get_blocks", json!({ "start_slot": 5 })))
        .await
        .assert_status_ok();

    assert_eq!(transport.sent()[0]["params"], json!([5]));
}

/// Text of a `tools/call` result flagged with `isError: true`.
fn tool_error_text(body: &Value) -> String {
    assert!(body.get("error").is_none(), "{body}");
    assert_eq!(body["result"]["isError"], true);
    body["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn unknown_tool_is_an_error_result() {
    let (server, transport) = build_test_app(MockTransport::failing());

    let resp = server
        .post("/mcp")
        .json(&tool_call("drain_wallet", json!({})))
        .await;

    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["id"], 1);
    assert!(tool_error_text(&body).contains("drain_wallet"));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn mistyped_arguments_are_an_error_result() {
    let (server, transport) = build_test_app(MockTransport::failing());

    let resp = server
        .post("/mcp")
        .json(&tool_call(
            "get_minimum_balance_for_rent_exemption",
            json!({ "size": "large" }),
        ))
        .await;

    let text = tool_error_text(&resp.json::<Value>());
    assert!(text.contains("get_minimum_balance_for_rent_exemption"));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn tools_call_without_params() {
    let (server, _) = build_test_app(MockTransport::failing());

    let resp = server
        .post("/mcp")
        .json(&json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call"}))
        .await;

    let body: Value = resp.json();
    assert_eq!(body["id"], 3);
    assert_eq!(body["error"]["code"], -32602);
}

#[tokio::test]
async fn mcp_unknown_method() {
    let (server, _) = build_test_app(MockTransport::failing());

    let resp = server
        .post("/mcp")
        .json(&rpc("resources/list", json!({})))
        .await;

    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], -32601);
}

#[tokio::test]
async fn malformed_body_is_parse_error() {
    let (server, _) = build_test_app(MockTransport::failing());

    let resp = server.post("/mcp").text("{not json").await;

    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], -32700);
    assert!(body["id"].is_null());
}

#[tokio::test]
async fn wrong_protocol_version_is_invalid_request() {
    let (server, _) = build_test_app(MockTransport::failing());

    let resp = server
        .post("/mcp")
        .json(&json!({"jsonrpc": "1.0", "id": 9, "method": "ping"}))
        .await;

    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], -32600);
    assert_eq!(body["id"], 9);
}

#[tokio::test]
async fn mcp_notification_returns_accepted() {
    let (server, _) = build_test_app(MockTransport::failing());

    let resp = server
        .post("/mcp")
        .json(&json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        }))
        .await;

    resp.assert_status(StatusCode::ACCEPTED);
}

#[tokio::test]
async fn message_for_unknown_session_is_not_found() {
    let (server, _) = build_test_app(MockTransport::failing());

    let resp = server
        .post("/messages/")
        .add_query_param("session_id", uuid::Uuid::new_v4().simple().to_string())
        .json(&rpc("ping", Value::Null))
        .await;

    resp.assert_status_not_found();
}

#[tokio::test]
async fn message_with_bad_session_id_is_rejected() {
    let (server, _) = build_test_app(MockTransport::failing());

    let resp = server
        .post("/messages/")
        .add_query_param("session_id", "nope")
        .json(&rpc("ping", Value::Null))
        .await;

    resp.assert_status_bad_request();
}

/// Minimal reader for `text/event-stream` bodies.
struct SseReader {
    response: reqwest::Response,
    buffer: String,
}

impl SseReader {
    /// Next (event, data) pair, skipping keep-alive comments.
    async fn next_event(&mut self) -> (String, String) {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let raw: String = self.buffer.drain(..end + 2).collect();
                let mut event = String::from("message");
                let mut data = String::new();
                for line in raw.lines() {
                    if let Some(value) = line.strip_prefix("event:") {
                        event = value.trim().to_string();
                    } else if let Some(value) = line.strip_prefix("data:") {
                        data.push_str(value.trim());
                    }
                }
                if data.is_empty() {
                    continue;
                }
                return (event, data);
            }

            let chunk = tokio::time::timeout(Duration::from_secs(5), self.response.chunk())
                .await
                .expect("timed out waiting for SSE event")
                .unwrap()
                .expect("SSE stream ended");
            self.buffer.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    }
}

#[tokio::test]
async fn sse_session_round_trip() {
    let reply = json!({"jsonrpc": "2.0", "result": 42, "id": 1});
    let state = AppState::new(
        ToolRegistry::solana(),
        Arc::new(MockTransport::replying(reply.clone())),
    );
    let app = solrpc_server::router::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::new();
    let response = client.get(format!("{base}/sse")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let mut sse = SseReader {
        response,
        buffer: String::new(),
    };

    let (event, endpoint) = sse.next_event().await;
    assert_eq!(event, "endpoint");
    assert!(endpoint.starts_with("/messages/?session_id="));

    let status = client
        .post(format!("{base}{endpoint}"))
        .json(&json!({"jsonrpc": "2.0", "id": 7, "method": "tools/call",
            "params": {"name": "get_slot", "arguments": {}}}))
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, reqwest::StatusCode::ACCEPTED);

    let (event, data) = sse.next_event().await;
    assert_eq!(event, "message");
    let body: Value = serde_json::from_str(&data).unwrap();
    assert_eq!(body["id"], 7);
    assert_eq!(tool_result(&body), reply);
}
