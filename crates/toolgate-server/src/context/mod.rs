//! Per-request authorization state.
//!
//! A [`RequestContext`] is created by the access-control middleware for every
//! inbound request and stored in that request's extensions. Later middleware
//! updates it in place; handlers receive a copy through the extractor below.
//! Nothing here is shared between requests.

use crate::secret::Credential;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde_json::Value;
use std::collections::HashMap;
use std::convert::Infallible;
use thiserror::Error;

/// Message recorded for every denied decision.
pub const ACCESS_DENIED_MESSAGE: &str =
    "Invalid or missing access credential: supply a valid x-access-key header to use this resource.";

/// Why an access decision came out negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// No access-key header on the request.
    MissingCredential,
    /// A key was presented but is not in the allow list.
    InvalidCredential,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::InvalidCredential => "invalid_credential",
        }
    }
}

/// Outcome of the access check. Immutable once built.
#[derive(Debug, Clone)]
pub struct AccessDecision {
    granted: bool,
    presented_key: Option<Credential>,
    error_message: Option<String>,
    reason: Option<DenialReason>,
}

impl AccessDecision {
    /// A positive decision carrying the key that earned it.
    pub fn granted(presented_key: Credential) -> Self {
        Self {
            granted: true,
            presented_key: Some(presented_key),
            error_message: None,
            reason: None,
        }
    }

    /// A negative decision.
    pub fn denied(reason: DenialReason) -> Self {
        Self {
            granted: false,
            presented_key: None,
            error_message: Some(ACCESS_DENIED_MESSAGE.to_string()),
            reason: Some(reason),
        }
    }

    pub fn is_granted(&self) -> bool {
        self.granted
    }

    pub fn presented_key(&self) -> Option<&Credential> {
        self.presented_key.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn denial_reason(&self) -> Option<DenialReason> {
        self.reason
    }
}

/// Third-party credentials staged for one tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopedCredentials {
    pub provider_api_key: Option<Credential>,
    pub provider_client_id: Option<Credential>,
}

impl ScopedCredentials {
    /// True when both provider values are present.
    pub fn is_complete(&self) -> bool {
        self.provider_api_key.is_some() && self.provider_client_id.is_some()
    }
}

/// Where a request currently sits in the authorization lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Access control has not run.
    Unchecked,
    Denied,
    Granted { credentials_scoped: bool },
}

/// Attempted to overwrite a write-once slot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("{0} already recorded for this request")]
    AlreadyRecorded(&'static str),

    #[error("credentials can only be scoped for a granted request")]
    NotGranted,
}

/// Request-local key space for authorization decisions and credentials.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    request_id: Option<String>,
    decision: Option<AccessDecision>,
    credentials: Option<ScopedCredentials>,
    values: HashMap<String, Value>,
}

impl RequestContext {
    /// Fresh, unchecked context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh context tagged with the request id used in logs.
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: Some(request_id.into()),
            ..Self::default()
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Record the access decision. Only the first call wins.
    pub fn record_decision(&mut self, decision: AccessDecision) -> Result<(), ContextError> {
        if self.decision.is_some() {
            return Err(ContextError::AlreadyRecorded("access decision"));
        }
        self.decision = Some(decision);
        Ok(())
    }

    pub fn decision(&self) -> Option<&AccessDecision> {
        self.decision.as_ref()
    }

    /// False when no decision was recorded.
    pub fn is_granted(&self) -> bool {
        self.decision.as_ref().is_some_and(AccessDecision::is_granted)
    }

    /// Stage provider credentials. Requires a granted decision and may only
    /// happen once per request.
    pub fn scope_credentials(&mut self, credentials: ScopedCredentials) -> Result<(), ContextError> {
        if !self.is_granted() {
            return Err(ContextError::NotGranted);
        }
        if self.credentials.is_some() {
            return Err(ContextError::AlreadyRecorded("scoped credentials"));
        }
        self.credentials = Some(credentials);
        Ok(())
    }

    pub fn credentials(&self) -> Option<&ScopedCredentials> {
        self.credentials.as_ref()
    }

    pub fn state(&self) -> ContextState {
        match &self.decision {
            None => ContextState::Unchecked,
            Some(d) if !d.is_granted() => ContextState::Denied,
            Some(_) => ContextState::Granted {
                credentials_scoped: self.credentials.is_some(),
            },
        }
    }

    /// Store an arbitrary value under `key`, replacing any previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

/// Handlers take `RequestContext` as an argument. A route mounted outside
/// the middleware chain gets an unchecked context, which the gate denies.
#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default())
    }
}
