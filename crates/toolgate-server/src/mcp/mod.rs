//! JSON-RPC tool endpoint.

pub mod handler;
pub mod types;

pub use handler::{dispatch, handle_mcp, SERVER_NAME};
pub use types::{JsonRpcError, JsonRpcId, JsonRpcRequest, JsonRpcResponse};

/// Protocol revision advertised by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const INITIALIZE_METHOD: &str = "initialize";
pub const PING_METHOD: &str = "ping";
pub const TOOLS_LIST_METHOD: &str = "tools/list";
pub const TOOLS_CALL_METHOD: &str = "tools/call";
