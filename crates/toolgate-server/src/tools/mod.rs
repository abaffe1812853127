//! Tools exposed over the JSON-RPC endpoint.
//!
//! A tool receives the caller's [`RequestContext`] alongside its arguments.
//! Privileged tools consult [`crate::gate::authorize`] before doing anything
//! else; public tools simply ignore the context.

pub mod google;
pub mod registry;
pub mod search;

use crate::context::RequestContext;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

pub use google::{GoogleSearchClient, ProviderResponse, SearchError, SearchProvider, SearchQuery};
pub use registry::ToolRegistry;
pub use search::{SearchGoogleTool, SEARCH_TOOL_NAME};

/// Tool metadata advertised by `tools/list`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// An invocable tool.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the `arguments` object.
    fn input_schema(&self) -> Value;

    /// Run the tool. The return value is the tool's own payload, usually a
    /// serialized JSON document; failures are reported inside it.
    async fn call(&self, context: &RequestContext, arguments: Value) -> String;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}
