//! Request logging with credential redaction.

pub mod layer;
pub mod redaction;

pub use layer::{LoggingConfig, LoggingLayer, LoggingMiddleware};
pub use redaction::{redact_headers, SENSITIVE_HEADERS};
