//! Error handling for the HTTP surface of the gateway.
//!
//! The access/scoping/gate core never fails a request; these errors only
//! cover transport-level problems and the informational routes.

pub mod response;
pub mod types;

pub use types::ApiError;
