//! MCP protocol implementation for JSON-RPC 2.0 communication.
//!
//! This module provides the core MCP server implementation including:
//! - JSON-RPC 2.0 request/response handling
//! - Tool definitions and schemas
//! - Stdio-based server communication

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use super::{handle_tool_call, SharedState};

#[cfg(test)]
#[path = "mcp_tests.rs"]
mod mcp_tests;

/// JSON-RPC 2.0 request structure.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Request identifier (None for notifications).
    pub id: Option<Value>,
    /// The method name to invoke.
    pub method: String,
    /// Optional parameters for the method.
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0").
    pub jsonrpc: String,
    /// Request identifier (null if notification, must always be present per spec).
    pub id: Value,
    /// The result on success (mutually exclusive with error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// The error on failure (mutually exclusive with result).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    /// Error code (negative for predefined errors).
    pub code: i32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional error data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// MCP server information returned during initialization.
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    /// The server name identifier.
    pub name: String,
    /// The server version string.
    pub version: String,
}

/// MCP server capabilities advertised to clients.
#[derive(Debug, Serialize)]
pub struct Capabilities {
    /// Tool-related capabilities.
    pub tools: ToolCapabilities,
}

/// Tool-specific capabilities.
#[derive(Debug, Serialize)]
pub struct ToolCapabilities {
    /// Whether the tool list can change dynamically.
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

/// Result of the MCP initialize handshake.
#[derive(Debug, Serialize)]
pub struct InitializeResult {
    /// The MCP protocol version supported.
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Server capabilities.
    pub capabilities: Capabilities,
    /// Server identification information.
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

/// MCP tool definition with JSON Schema.
#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    /// Unique tool name (used in tool calls).
    pub name: String,
    /// Human-readable description of the tool.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Parameters for a tools/call request.
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    /// The name of the tool to invoke.
    pub name: String,
    /// Optional arguments for the tool.
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Content item within a tool result.
#[derive(Debug, Serialize)]
pub struct ToolResultContent {
    /// The content type (e.g., "text").
    #[serde(rename = "type")]
    pub content_type: String,
    /// The text content of the result.
    pub text: String,
}

/// Result of a tool invocation.
#[derive(Debug, Serialize)]
pub struct ToolCallResult {
    /// The result content items.
    pub content: Vec<ToolResultContent>,
    /// Whether the result represents an error.
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl JsonRpcResponse {
    /// Create a success response
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// MCP Server running over stdio.
///
/// Handles JSON-RPC 2.0 messages over stdin/stdout for MCP protocol
/// communication with clients.
pub struct McpServer {
    /// Shared application state.
    state: SharedState,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Run the server using async stdio
    pub async fn run(&self) -> std::io::Result<()> {
        info!("MCP Compat Reports Server starting...");

        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin);
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            // EOF reached
            if bytes_read == 0 {
                info!("EOF received, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            debug!(request = %trimmed, "Received request");

            let response = match serde_json::from_str::<JsonRpcRequest>(trimmed) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => {
                    error!(error = %e, "Failed to parse request");
                    Some(JsonRpcResponse::error(
                        None,
                        -32700,
                        format!("Parse error: {}", e),
                    ))
                }
            };

            // Only send response if not a notification (per JSON-RPC 2.0 spec)
            if let Some(response) = response {
                let response_json = serde_json::to_string(&response)?;
                debug!(response = %response_json, "Sending response");

                stdout.write_all(response_json.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle a single JSON-RPC request
    /// Returns None for notifications (requests without id) per JSON-RPC 2.0 spec
    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        // Check if this is a notification (no id = no response required)
        let is_notification = request.id.is_none();

        match request.method.as_str() {
            "initialize" => Some(self.handle_initialize(request.id)),
            "initialized" => {
                // Notification - no response per JSON-RPC 2.0
                debug!("Received initialized notification");
                None
            }
            "notifications/cancelled" => {
                // Notification - no response
                debug!("Received cancelled notification");
                None
            }
            "tools/list" => Some(self.handle_tools_list(request.id)),
            "tools/call" => Some(self.handle_tool_call(request.id, request.params).await),
            "ping" => Some(JsonRpcResponse::success(
                request.id,
                Value::Object(Default::default()),
            )),
            method => {
                // For unknown methods, only respond if it's a request (has id)
                if is_notification {
                    debug!(method = %method, "Unknown notification, ignoring");
                    None
                } else {
                    error!(method = %method, "Unknown method");
                    Some(JsonRpcResponse::error(
                        request.id,
                        -32601,
                        format!("Method not found: {}", method),
                    ))
                }
            }
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        info!("Handling initialize request");

        let result = InitializeResult {
            protocol_version: "2024-11-05".to_string(),
            capabilities: Capabilities {
                tools: ToolCapabilities {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: "mcp-compat-reports".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        match serde_json::to_value(result) {
            Ok(val) => JsonRpcResponse::success(id, val),
            Err(e) => {
                error!(error = %e, "Failed to serialize initialize result");
                JsonRpcResponse::error(id, -32603, format!("Internal error: {}", e))
            }
        }
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        info!("Handling tools/list request");

        let tools = all_tools();

        JsonRpcResponse::success(
            id,
            serde_json::json!({
                "tools": tools
            }),
        )
    }

    /// Handle tools/call request
    async fn handle_tool_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(p) => p,
                Err(e) => {
                    return JsonRpcResponse::error(id, -32602, format!("Invalid params: {}", e));
                }
            },
            None => {
                return JsonRpcResponse::error(id, -32602, "Missing params");
            }
        };

        info!(tool = %params.name, "Handling tool call");

        let (content, is_error) =
            match handle_tool_call(&self.state, &params.name, params.arguments).await {
                Ok(result) => {
                    let text = serde_json::to_string_pretty(&result).unwrap_or_else(|e| {
                        error!(error = %e, "Failed to serialize tool result");
                        format!("{{\"error\": \"Serialization failed: {}\"}}", e)
                    });
                    (
                        ToolResultContent {
                            content_type: "text".to_string(),
                            text,
                        },
                        None,
                    )
                }
                Err(e) => (
                    ToolResultContent {
                        content_type: "text".to_string(),
                        text: format!("Error: {}", e),
                    },
                    Some(true),
                ),
            };

        let tool_result = ToolCallResult {
            content: vec![content],
            is_error,
        };

        match serde_json::to_value(tool_result) {
            Ok(val) => JsonRpcResponse::success(id, val),
            Err(e) => {
                error!(error = %e, "Failed to serialize tool call result");
                JsonRpcResponse::error(id.clone(), -32603, format!("Internal error: {}", e))
            }
        }
    }
}

/// Every tool this server advertises, in registry order.
pub fn all_tools() -> Vec<Tool> {
    vec![
        get_submit_report_tool(),
        get_reports_tool(),
        get_aggregate_tool(),
        get_upvote_tool(),
        get_downvote_tool(),
        get_stats_tool(),
        get_export_tool(),
        get_import_tool(),
        get_clear_tool(),
        get_matrix_tool(),
        get_transport_info_tool(),
    ]
}

/// Get the submit report tool definition
fn get_submit_report_tool() -> Tool {
    Tool {
        name: "compat_submit_report".to_string(),
        description: "Submit a compatibility report for a client-server pair. Resubmitting for the same pair overwrites the prior report while preserving its id and votes.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "client_id": {
                    "type": "string",
                    "description": "Client identifier (slug)"
                },
                "client_name": {
                    "type": "string",
                    "description": "Human-readable client name"
                },
                "server_id": {
                    "type": "string",
                    "description": "Server identifier (slug)"
                },
                "server_name": {
                    "type": "string",
                    "description": "Human-readable server name"
                },
                "status": {
                    "type": "string",
                    "enum": ["works", "partial", "broken", "unknown"],
                    "description": "The observed compatibility"
                },
                "transport": {
                    "type": "string",
                    "enum": ["stdio", "sse", "both"],
                    "description": "Transport the pair was exercised over"
                },
                "notes": {
                    "type": "string",
                    "description": "Free-text notes"
                },
                "version": {
                    "type": "string",
                    "description": "Client/server version information"
                }
            },
            "required": ["client_id", "client_name", "server_id", "server_name", "status", "transport"],
            "additionalProperties": false
        }),
    }
}

/// Get the reports listing tool definition
fn get_reports_tool() -> Tool {
    Tool {
        name: "compat_reports".to_string(),
        description: "List retained compatibility reports, optionally filtered by client and/or server id.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "client_id": {
                    "type": "string",
                    "description": "Only reports for this client"
                },
                "server_id": {
                    "type": "string",
                    "description": "Only reports for this server"
                }
            },
            "additionalProperties": false
        }),
    }
}

/// Get the aggregate status tool definition
fn get_aggregate_tool() -> Tool {
    Tool {
        name: "compat_aggregate".to_string(),
        description: "Weighted consensus status for one client-server pair, with confidence percentage and report count.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "client_id": {
                    "type": "string",
                    "description": "Client identifier"
                },
                "server_id": {
                    "type": "string",
                    "description": "Server identifier"
                }
            },
            "required": ["client_id", "server_id"],
            "additionalProperties": false
        }),
    }
}

/// Get the upvote tool definition
fn get_upvote_tool() -> Tool {
    Tool {
        name: "compat_upvote".to_string(),
        description: "Upvote a compatibility report by id.".to_string(),
        input_schema: vote_schema(),
    }
}

/// Get the downvote tool definition
fn get_downvote_tool() -> Tool {
    Tool {
        name: "compat_downvote".to_string(),
        description: "Downvote a compatibility report by id.".to_string(),
        input_schema: vote_schema(),
    }
}

fn vote_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "report_id": {
                "type": "string",
                "description": "The report id to vote on"
            }
        },
        "required": ["report_id"],
        "additionalProperties": false
    })
}

/// Get the stats tool definition
fn get_stats_tool() -> Tool {
    Tool {
        name: "compat_stats".to_string(),
        description: "Summary statistics over the retained reports: totals, per-status, per-client, per-server, verified count.".to_string(),
        input_schema: empty_schema(),
    }
}

/// Get the export tool definition
fn get_export_tool() -> Tool {
    Tool {
        name: "compat_export".to_string(),
        description: "Export the retained reports as a JSON document.".to_string(),
        input_schema: empty_schema(),
    }
}

/// Get the import tool definition
fn get_import_tool() -> Tool {
    Tool {
        name: "compat_import".to_string(),
        description: "Merge a JSON report collection into the store. Entries with known ids or missing identity fields are skipped; returns the number merged.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "json": {
                    "type": "string",
                    "description": "The serialized report collection"
                }
            },
            "required": ["json"],
            "additionalProperties": false
        }),
    }
}

/// Get the clear tool definition
fn get_clear_tool() -> Tool {
    Tool {
        name: "compat_clear".to_string(),
        description: "Remove every retained report. Administrative operation.".to_string(),
        input_schema: empty_schema(),
    }
}

/// Get the effective matrix tool definition
fn get_matrix_tool() -> Tool {
    Tool {
        name: "compat_matrix".to_string(),
        description: "The effective compatibility matrix: the editorial base table merged with high-confidence user consensus.".to_string(),
        input_schema: empty_schema(),
    }
}

/// Get the transport info tool definition
fn get_transport_info_tool() -> Tool {
    Tool {
        name: "compat_transport_info".to_string(),
        description: "Transport compatibility between one client and one server from the base matrix.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "client_id": {
                    "type": "string",
                    "description": "Client identifier"
                },
                "server_id": {
                    "type": "string",
                    "description": "Server identifier"
                }
            },
            "required": ["client_id", "server_id"],
            "additionalProperties": false
        }),
    }
}

fn empty_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {},
        "additionalProperties": false
    })
}
