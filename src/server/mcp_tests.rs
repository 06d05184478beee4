//! Unit tests for JSON-RPC handling and tool definitions.

use std::sync::Arc;

use serde_json::{json, Value};

use super::*;
use crate::compat::BaseMatrix;
use crate::config::{Config, DEFAULT_MAX_REPORTS};
use crate::server::AppState;
use crate::storage::{MemoryPersistence, ReportStore};

fn create_test_server() -> McpServer {
    let store = ReportStore::new(Arc::new(MemoryPersistence::new()), DEFAULT_MAX_REPORTS);
    let state = Arc::new(AppState::new(
        Config::default(),
        store,
        BaseMatrix::default(),
    ));
    McpServer::new(state)
}

fn request(method: &str, id: Option<Value>, params: Option<Value>) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id,
        method: method.to_string(),
        params,
    }
}

// ============================================================================
// JsonRpcResponse tests
// ============================================================================

#[test]
fn test_success_response() {
    let response = JsonRpcResponse::success(Some(json!(1)), json!({"ok": true}));

    assert_eq!(response.jsonrpc, "2.0");
    assert_eq!(response.id, json!(1));
    assert!(response.result.is_some());
    assert!(response.error.is_none());
}

#[test]
fn test_error_response() {
    let response = JsonRpcResponse::error(Some(json!(2)), -32601, "Method not found");

    assert_eq!(response.jsonrpc, "2.0");
    assert_eq!(response.id, json!(2));
    assert!(response.result.is_none());
    let error = response.error.expect("should carry an error");
    assert_eq!(error.code, -32601);
    assert_eq!(error.message, "Method not found");
}

#[test]
fn test_error_response_without_id_uses_null() {
    let response = JsonRpcResponse::error(None, -32700, "Parse error");
    assert_eq!(response.id, Value::Null);
}

#[test]
fn test_response_serialization_omits_empty_fields() {
    let response = JsonRpcResponse::success(Some(json!(1)), json!({}));
    let serialized = serde_json::to_value(&response).unwrap();

    assert!(serialized.get("error").is_none());
    assert!(serialized.get("result").is_some());
}

// ============================================================================
// Request dispatch tests
// ============================================================================

#[tokio::test]
async fn test_initialize_returns_server_info() {
    let server = create_test_server();

    let response = server
        .handle_request(request("initialize", Some(json!(1)), None))
        .await
        .expect("initialize should respond");

    let result = response.result.expect("should carry a result");
    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert_eq!(result["serverInfo"]["name"], "mcp-compat-reports");
    assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
}

#[tokio::test]
async fn test_initialized_notification_has_no_response() {
    let server = create_test_server();

    let response = server
        .handle_request(request("initialized", None, None))
        .await;

    assert!(response.is_none());
}

#[tokio::test]
async fn test_ping_returns_empty_object() {
    let server = create_test_server();

    let response = server
        .handle_request(request("ping", Some(json!(7)), None))
        .await
        .expect("ping should respond");

    assert_eq!(response.result, Some(json!({})));
}

#[tokio::test]
async fn test_unknown_method_is_error() {
    let server = create_test_server();

    let response = server
        .handle_request(request("no/such/method", Some(json!(3)), None))
        .await
        .expect("unknown request should respond");

    let error = response.error.expect("should carry an error");
    assert_eq!(error.code, -32601);
}

#[tokio::test]
async fn test_unknown_notification_is_ignored() {
    let server = create_test_server();

    let response = server.handle_request(request("no/such/method", None, None)).await;

    assert!(response.is_none());
}

#[tokio::test]
async fn test_tools_call_without_params_is_invalid() {
    let server = create_test_server();

    let response = server
        .handle_request(request("tools/call", Some(json!(4)), None))
        .await
        .expect("tools/call should respond");

    let error = response.error.expect("should carry an error");
    assert_eq!(error.code, -32602);
}

#[tokio::test]
async fn test_tools_call_unknown_tool_is_tool_error() {
    let server = create_test_server();

    let response = server
        .handle_request(request(
            "tools/call",
            Some(json!(5)),
            Some(json!({"name": "compat_frobnicate", "arguments": {}})),
        ))
        .await
        .expect("tools/call should respond");

    // Tool-level failures are reported in-band, not as JSON-RPC errors.
    let result = response.result.expect("should carry a result");
    assert_eq!(result["isError"], true);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Unknown tool"));
}

#[tokio::test]
async fn test_tools_call_round_trip() {
    let server = create_test_server();

    let response = server
        .handle_request(request(
            "tools/call",
            Some(json!(6)),
            Some(json!({
                "name": "compat_submit_report",
                "arguments": {
                    "client_id": "cursor",
                    "client_name": "Cursor",
                    "server_id": "github-mcp",
                    "server_name": "GitHub MCP",
                    "status": "works",
                    "transport": "stdio"
                }
            })),
        ))
        .await
        .expect("tools/call should respond");

    let result = response.result.expect("should carry a result");
    assert!(result.get("isError").is_none());
    let text = result["content"][0]["text"].as_str().unwrap();
    let report: Value = serde_json::from_str(text).unwrap();
    assert_eq!(report["client_id"], "cursor");
    assert_eq!(report["status"], "works");
}

// ============================================================================
// Tool definition tests
// ============================================================================

#[test]
fn test_tool_registry_names_are_unique() {
    let tools = all_tools();
    let mut names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    let before = names.len();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), before);
}

#[test]
fn test_tool_registry_covers_all_operations() {
    let tools = all_tools();
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();

    for expected in [
        "compat_submit_report",
        "compat_reports",
        "compat_aggregate",
        "compat_upvote",
        "compat_downvote",
        "compat_stats",
        "compat_export",
        "compat_import",
        "compat_clear",
        "compat_matrix",
        "compat_transport_info",
    ] {
        assert!(names.contains(&expected), "missing tool: {}", expected);
    }
}

#[test]
fn test_tool_schemas_are_objects() {
    for tool in all_tools() {
        assert_eq!(
            tool.input_schema["type"], "object",
            "tool {} schema must be an object",
            tool.name
        );
        assert!(
            !tool.description.is_empty(),
            "tool {} needs a description",
            tool.name
        );
    }
}

#[test]
fn test_submit_tool_requires_identity_fields() {
    let tools = all_tools();
    let submit = tools
        .iter()
        .find(|t| t.name == "compat_submit_report")
        .expect("submit tool should be registered");

    let required: Vec<&str> = submit.input_schema["required"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();

    for field in ["client_id", "server_id", "status", "transport"] {
        assert!(required.contains(&field), "missing required field {}", field);
    }
}
