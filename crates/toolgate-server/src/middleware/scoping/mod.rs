//! Credential scoping for tool invocations that call a third-party provider.

pub mod detect;
pub mod layer;

pub use detect::{invoked_tool, is_json_content, requires_provider_credentials};
pub use layer::{
    extract_provider_credentials, CredentialScopingLayer, CredentialScopingMiddleware,
    DEFAULT_MAX_BODY_BYTES,
};
