//! Common test utilities for router-level tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};
use toolgate_server::{routes::create_router, AppState, ServerConfig};
use tower::ServiceExt;

pub const VALID_KEY: &str = "abc123";

/// Test context with a temporary storage directory.
pub struct TestContext {
    pub temp_dir: TempDir,
    pub config: ServerConfig,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let mut config = ServerConfig::default();
        config.access.keys_file_path = temp_dir.path().join("access_keys.json");
        config.messages.file_path = temp_dir.path().join("default_tools_messages.json");
        // Unreachable unless a test points it at a mock.
        config.search.endpoint = "http://127.0.0.1:1/customsearch/v1".to_string();
        config.search.timeout_secs = 2;

        Self { temp_dir, config }
    }

    /// Write the allow-list file verbatim.
    pub fn with_keys_file(self, contents: &str) -> Self {
        std::fs::write(&self.config.access.keys_file_path, contents)
            .expect("Failed to write access keys");
        self
    }

    pub fn with_keys(self, keys: &[&str]) -> Self {
        let contents = serde_json::to_string(keys).expect("Failed to encode keys");
        self.with_keys_file(&contents)
    }

    pub fn with_messages(self, messages: Value) -> Self {
        std::fs::write(&self.config.messages.file_path, messages.to_string())
            .expect("Failed to write messages");
        self
    }

    pub fn with_search_endpoint(mut self, endpoint: String) -> Self {
        self.config.search.endpoint = endpoint;
        self
    }

    pub fn keys_path(&self) -> PathBuf {
        self.config.access.keys_file_path.clone()
    }

    pub fn state(&self) -> AppState {
        AppState::new(&self.config).expect("Failed to build state")
    }

    pub fn router(&self) -> Router {
        create_router(self.state())
    }
}

/// A `tools/call` request for the search tool.
pub fn search_request(
    access_key: Option<&str>,
    provider: Option<(&str, &str)>,
    arguments: Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json");
    if let Some(key) = access_key {
        builder = builder.header("x-access-key", key);
    }
    if let Some((api_key, client_id)) = provider {
        builder = builder
            .header("x-google-api-key", api_key)
            .header("x-google-csi-id", client_id);
    }

    let body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": { "name": "search_google_tool", "arguments": arguments }
    });
    builder
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router
        .clone()
        .oneshot(request)
        .await
        .expect("Router is infallible")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

/// The tool's own payload from a `tools/call` response.
pub async fn tool_payload(response: Response<Body>) -> Value {
    let rpc = body_json(response).await;
    let text = rpc["result"]["content"][0]["text"]
        .as_str()
        .unwrap_or_else(|| panic!("Not a tool result: {rpc}"));
    serde_json::from_str(text).expect("Tool payload is not JSON")
}
