//! Middleware for the toolgate server.
//!
//! The default chain, outermost first:
//!
//! | priority | interceptor          | effect                                   |
//! |----------|----------------------|------------------------------------------|
//! | 0        | [`LoggingLayer`]         | request span, request id, redacted logs  |
//! | 1        | [`AccessControlLayer`]   | records the access decision              |
//! | 2        | [`CredentialScopingLayer`] | stages provider credentials            |
//!
//! None of them rejects a request on access grounds.

pub mod access;
pub mod chain;
pub mod logging;
pub mod scoping;

pub use access::{AccessControlLayer, AccessControlMiddleware};
pub use chain::MiddlewareChain;
pub use logging::{LoggingConfig, LoggingLayer, LoggingMiddleware};
pub use scoping::{CredentialScopingLayer, CredentialScopingMiddleware};

/// Header carrying the caller's access key.
pub const ACCESS_KEY_HEADER: &str = "x-access-key";
/// Header carrying the search provider API key.
pub const PROVIDER_API_KEY_HEADER: &str = "x-google-api-key";
/// Header carrying the search provider engine (client/site) id.
pub const PROVIDER_CLIENT_ID_HEADER: &str = "x-google-csi-id";

/// Priority of the request logging interceptor.
pub const LOGGING_PRIORITY: u16 = 0;
/// Priority of the access-control interceptor.
pub const ACCESS_CONTROL_PRIORITY: u16 = 1;
/// Priority of the credential-scoping interceptor.
pub const CREDENTIAL_SCOPING_PRIORITY: u16 = 2;

/// Request id assigned by the logging layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
