//! Enforcement point for privileged operations.
//!
//! The middleware chain only records whether a request may use privileged
//! tools. The tool itself calls [`authorize`] as its first statement and
//! returns [`AuthorizationResult::into_envelope`] on denial, before touching
//! credentials or the network. New privileged tools get the same protection
//! by making the same call.

use crate::context::RequestContext;
use serde::Serialize;
use tracing::warn;

/// Message used when a request never went through access control.
pub const UNAUTHENTICATED_MESSAGE: &str = "User is not authenticated.";

/// Result of consulting the recorded access decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationResult {
    Authorized,
    Denied(String),
}

impl AuthorizationResult {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }

    /// The serialized error envelope a denied operation returns, or `None`
    /// when the operation may proceed.
    pub fn into_envelope(self) -> Option<String> {
        match self {
            Self::Authorized => None,
            Self::Denied(message) => Some(denial_envelope(&message)),
        }
    }
}

#[derive(Serialize)]
struct DenialEnvelope<'a> {
    status: &'static str,
    error: &'a str,
}

/// `{"status":"error","error":<message>}` as a JSON string.
pub fn denial_envelope(message: &str) -> String {
    let envelope = DenialEnvelope {
        status: "error",
        error: message,
    };
    // Serializing two string fields cannot fail.
    serde_json::to_string(&envelope).unwrap_or_else(|_| {
        String::from(r#"{"status":"error","error":"User is not authenticated."}"#)
    })
}

/// Check the decision recorded for this request.
///
/// Denied when the decision is negative or was never recorded.
pub fn authorize(context: &RequestContext) -> AuthorizationResult {
    match context.decision() {
        Some(decision) if decision.is_granted() => AuthorizationResult::Authorized,
        Some(decision) => {
            warn!(
                event = "privileged_call_denied",
                request_id = context.request_id().unwrap_or("-"),
                reason = decision.denial_reason().map(|r| r.as_str()).unwrap_or("unknown"),
                "User is not authenticated"
            );
            AuthorizationResult::Denied(
                decision
                    .error_message()
                    .unwrap_or(UNAUTHENTICATED_MESSAGE)
                    .to_string(),
            )
        }
        None => {
            warn!(
                event = "privileged_call_denied",
                request_id = context.request_id().unwrap_or("-"),
                reason = "unchecked",
                "Privileged call reached without an access decision"
            );
            AuthorizationResult::Denied(UNAUTHENTICATED_MESSAGE.to_string())
        }
    }
}
