//! `POST /mcp` dispatcher.

use super::types::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallParams, JSONRPC_VERSION};
use super::{INITIALIZE_METHOD, PING_METHOD, PROTOCOL_VERSION, TOOLS_CALL_METHOD, TOOLS_LIST_METHOD};
use crate::context::RequestContext;
use crate::state::AppState;
use crate::tools::ToolRegistry;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// Name reported in `initialize`.
pub const SERVER_NAME: &str = "toolgate";

/// Axum handler for the JSON-RPC endpoint.
pub async fn handle_mcp(
    State(state): State<AppState>,
    context: RequestContext,
    body: Bytes,
) -> Response {
    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(error) => {
            debug!(code = error.code, "Rejected JSON-RPC payload");
            return Json(JsonRpcResponse::error(None, error)).into_response();
        }
    };

    if request.is_notification() {
        debug!(method = %request.method, "Notification acknowledged");
        return StatusCode::ACCEPTED.into_response();
    }

    Json(dispatch(&state.tools, &context, request).await).into_response()
}

fn parse_request(body: &[u8]) -> Result<JsonRpcRequest, JsonRpcError> {
    let value: Value = serde_json::from_slice(body).map_err(JsonRpcError::parse_error)?;
    if value.is_array() {
        return Err(JsonRpcError::invalid_request("batch requests are not supported"));
    }

    let request: JsonRpcRequest =
        serde_json::from_value(value).map_err(JsonRpcError::invalid_request)?;
    if request.jsonrpc.as_deref() != Some(JSONRPC_VERSION) {
        return Err(JsonRpcError::invalid_request("jsonrpc must be \"2.0\""));
    }
    Ok(request)
}

/// Route one request to its method implementation.
pub async fn dispatch(
    tools: &ToolRegistry,
    context: &RequestContext,
    request: JsonRpcRequest,
) -> JsonRpcResponse {
    let JsonRpcRequest {
        id, method, params, ..
    } = request;

    match method.as_str() {
        INITIALIZE_METHOD => JsonRpcResponse::success(id, initialize_result()),
        PING_METHOD => JsonRpcResponse::success(id, json!({})),
        TOOLS_LIST_METHOD => JsonRpcResponse::success(id, json!({ "tools": tools.definitions() })),
        TOOLS_CALL_METHOD => match call_tool(tools, context, params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        },
        other => {
            debug!(method = %other, "Unknown JSON-RPC method");
            JsonRpcResponse::error(id, JsonRpcError::method_not_found(other))
        }
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        }
    })
}

async fn call_tool(
    tools: &ToolRegistry,
    context: &RequestContext,
    params: Option<Value>,
) -> Result<Value, JsonRpcError> {
    let params = params.ok_or_else(|| JsonRpcError::invalid_params("missing params"))?;
    let ToolCallParams { name, arguments } =
        serde_json::from_value(params).map_err(JsonRpcError::invalid_params)?;

    let tool = tools.get(&name).ok_or_else(|| {
        warn!(tool = %name, "Call to unknown tool");
        JsonRpcError::invalid_params(format!("unknown tool {name}"))
    })?;

    info!(
        tool = %name,
        request_id = context.request_id().unwrap_or("-"),
        "Invoking tool"
    );
    let text = tool
        .call(context, arguments.unwrap_or_else(|| json!({})))
        .await;

    Ok(json!({
        "content": [{ "type": "text", "text": text }]
    }))
}
