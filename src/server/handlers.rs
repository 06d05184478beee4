use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::SharedState;
use crate::compat::{aggregate, merge_with_base_matrix};
use crate::error::{McpError, McpResult};
use crate::storage::ReportInput;

/// Route tool calls to appropriate handlers
pub async fn handle_tool_call(
    state: &SharedState,
    tool_name: &str,
    arguments: Option<Value>,
) -> McpResult<Value> {
    info!(tool = %tool_name, "Routing tool call");

    match tool_name {
        "compat_submit_report" => handle_submit_report(state, arguments).await,
        "compat_reports" => handle_reports(state, arguments).await,
        "compat_aggregate" => handle_aggregate(state, arguments).await,
        "compat_upvote" => handle_vote(state, arguments, true).await,
        "compat_downvote" => handle_vote(state, arguments, false).await,
        "compat_stats" => handle_stats(state).await,
        "compat_export" => handle_export(state).await,
        "compat_import" => handle_import(state, arguments).await,
        "compat_clear" => handle_clear(state).await,
        "compat_matrix" => handle_matrix(state).await,
        "compat_transport_info" => handle_transport_info(state, arguments).await,
        _ => Err(McpError::UnknownTool {
            tool_name: tool_name.to_string(),
        }),
    }
}

/// Handle compat_submit_report tool call
async fn handle_submit_report(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    let input: ReportInput = parse_arguments("compat_submit_report", arguments)?;

    let report = state.store.submit(input).await;
    serde_json::to_value(report).map_err(McpError::Json)
}

/// Handle compat_reports tool call
async fn handle_reports(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    #[derive(Deserialize, Default)]
    struct ReportsParams {
        client_id: Option<String>,
        server_id: Option<String>,
    }

    // Filters are optional; no arguments means the full collection.
    let params: ReportsParams = match arguments {
        Some(args) => {
            serde_json::from_value(args).map_err(|e| McpError::InvalidParameters {
                tool_name: "compat_reports".to_string(),
                message: e.to_string(),
            })?
        }
        None => ReportsParams::default(),
    };

    let reports = match (params.client_id.as_deref(), params.server_id.as_deref()) {
        (Some(client), Some(server)) => state.store.for_pair(client, server).await,
        (Some(client), None) => state.store.for_client(client).await,
        (None, Some(server)) => state.store.for_server(server).await,
        (None, None) => state.store.all().await,
    };

    serde_json::to_value(reports).map_err(McpError::Json)
}

/// Handle compat_aggregate tool call
async fn handle_aggregate(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    let params: PairParams = parse_arguments("compat_aggregate", arguments)?;

    let reports = state.store.for_pair(&params.client_id, &params.server_id).await;
    let agg = aggregate(&reports);
    serde_json::to_value(agg).map_err(McpError::Json)
}

/// Handle compat_upvote / compat_downvote tool calls
async fn handle_vote(
    state: &SharedState,
    arguments: Option<Value>,
    upvote: bool,
) -> McpResult<Value> {
    #[derive(Deserialize)]
    struct VoteParams {
        report_id: String,
    }

    let tool_name = if upvote { "compat_upvote" } else { "compat_downvote" };
    let params: VoteParams = parse_arguments(tool_name, arguments)?;

    let report = if upvote {
        state.store.upvote(&params.report_id).await
    } else {
        state.store.downvote(&params.report_id).await
    };

    match report {
        Some(report) => serde_json::to_value(report).map_err(McpError::Json),
        None => Err(McpError::ExecutionFailed {
            message: format!("Report not found: {}", params.report_id),
        }),
    }
}

/// Handle compat_stats tool call
async fn handle_stats(state: &SharedState) -> McpResult<Value> {
    let stats = state.store.stats().await;
    serde_json::to_value(stats).map_err(McpError::Json)
}

/// Handle compat_export tool call
async fn handle_export(state: &SharedState) -> McpResult<Value> {
    let json = state.store.export().await;
    Ok(serde_json::json!({ "json": json }))
}

/// Handle compat_import tool call
async fn handle_import(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    #[derive(Deserialize)]
    struct ImportParams {
        json: String,
    }

    let params: ImportParams = parse_arguments("compat_import", arguments)?;

    let merged = state.store.import(&params.json).await;
    Ok(serde_json::json!({ "merged": merged }))
}

/// Handle compat_clear tool call
async fn handle_clear(state: &SharedState) -> McpResult<Value> {
    state.store.clear().await;
    Ok(serde_json::json!({ "cleared": true }))
}

/// Handle compat_matrix tool call
async fn handle_matrix(state: &SharedState) -> McpResult<Value> {
    let reports = state.store.all().await;
    let effective = merge_with_base_matrix(&state.matrix, &reports);
    serde_json::to_value(effective).map_err(McpError::Json)
}

/// Handle compat_transport_info tool call
async fn handle_transport_info(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    let params: PairParams = parse_arguments("compat_transport_info", arguments)?;

    let info = state.matrix.transport_info(&params.client_id, &params.server_id);
    serde_json::to_value(info).map_err(McpError::Json)
}

/// Pair-addressed tool parameters.
#[derive(Deserialize)]
struct PairParams {
    client_id: String,
    server_id: String,
}

/// Parse tool arguments into a typed parameter struct
fn parse_arguments<T: serde::de::DeserializeOwned>(
    tool_name: &str,
    arguments: Option<Value>,
) -> McpResult<T> {
    match arguments {
        Some(args) => serde_json::from_value(args).map_err(|e| McpError::InvalidParameters {
            tool_name: tool_name.to_string(),
            message: e.to_string(),
        }),
        None => Err(McpError::InvalidParameters {
            tool_name: tool_name.to_string(),
            message: "Missing arguments".to_string(),
        }),
    }
}
