//! Detects request bodies that invoke a credential-scoped tool.

use crate::mcp::TOOLS_CALL_METHOD;
use crate::tools::search::SEARCH_TOOL_NAME;
use axum::http::{header, HeaderMap};
use serde_json::Value;

/// True when the `content-type` header names a JSON body. Parameters such as
/// `charset` are ignored.
pub fn is_json_content(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<mime::Mime>().ok())
        .is_some_and(|m| m.essence_str() == mime::APPLICATION_JSON.essence_str())
}

/// Name of the tool invoked by a JSON-RPC `tools/call` body, if any.
///
/// Anything that does not parse or has a different shape yields `None`.
pub fn invoked_tool(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    if value.get("method")?.as_str()? != TOOLS_CALL_METHOD {
        return None;
    }
    value
        .get("params")?
        .get("name")?
        .as_str()
        .map(str::to_string)
}

/// Whether the body calls the search tool and therefore needs provider
/// credentials.
pub fn requires_provider_credentials(body: &[u8]) -> bool {
    invoked_tool(body).as_deref() == Some(SEARCH_TOOL_NAME)
}
