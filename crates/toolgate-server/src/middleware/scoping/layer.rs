//! Credential-scoping middleware layer.

use super::detect::{is_json_content, requires_provider_credentials};
use crate::{
    context::{RequestContext, ScopedCredentials},
    error::ApiError,
    middleware::{PROVIDER_API_KEY_HEADER, PROVIDER_CLIENT_ID_HEADER},
    secret::Credential,
};
use axum::{
    body::Body,
    http::{header, HeaderMap, Request},
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{debug, error, trace, warn};

/// Default cap on buffered request bodies.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Stages provider credentials for granted requests that call the search
/// tool. Every other request passes through untouched.
#[derive(Clone)]
pub struct CredentialScopingLayer {
    max_body_bytes: usize,
    trace_bodies: bool,
}

impl CredentialScopingLayer {
    pub fn new() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            trace_bodies: false,
        }
    }

    /// Largest body that will be buffered for inspection.
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Trace the raw body of granted requests at TRACE level.
    pub fn with_body_tracing(mut self, enabled: bool) -> Self {
        self.trace_bodies = enabled;
        self
    }
}

impl Default for CredentialScopingLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for CredentialScopingLayer {
    type Service = CredentialScopingMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CredentialScopingMiddleware {
            inner,
            max_body_bytes: self.max_body_bytes,
            trace_bodies: self.trace_bodies,
        }
    }
}

/// Credential-scoping middleware service.
#[derive(Clone)]
pub struct CredentialScopingMiddleware<S> {
    inner: S,
    max_body_bytes: usize,
    trace_bodies: bool,
}

impl<S> Service<Request<Body>> for CredentialScopingMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let max_body_bytes = self.max_body_bytes;
        let trace_bodies = self.trace_bodies;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let granted = req
                .extensions()
                .get::<RequestContext>()
                .is_some_and(RequestContext::is_granted);
            let json = is_json_content(req.headers());

            if !granted || !(json || trace_bodies) {
                return inner.call(req).await;
            }

            let (mut parts, body) = req.into_parts();
            let bytes = match buffer_body(&parts.headers, body, max_body_bytes).await {
                Ok(bytes) => bytes,
                Err(err) => return Ok(err.into_response()),
            };

            if trace_bodies {
                trace!(body = %String::from_utf8_lossy(&bytes), "Raw request body");
            }

            if json && requires_provider_credentials(&bytes) {
                let credentials = extract_provider_credentials(&parts.headers);
                match parts.extensions.get_mut::<RequestContext>() {
                    Some(context) => {
                        if let Err(err) = context.scope_credentials(credentials) {
                            warn!(error = %err, "Provider credentials not staged");
                        } else {
                            debug!(event = "credentials_scoped", "Provider credentials staged");
                        }
                    }
                    None => warn!("Granted request lost its context before scoping"),
                }
            }

            inner.call(Request::from_parts(parts, Body::from(bytes))).await
        })
    }
}

async fn buffer_body(
    headers: &HeaderMap,
    body: Body,
    limit: usize,
) -> Result<axum::body::Bytes, ApiError> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(ApiError::PayloadTooLarge { limit });
    }

    // Bodies without a Content-Length only trip the limit while streaming.
    let collected = Limited::new(body, limit).collect().await.map_err(|e| {
        if e.downcast_ref::<LengthLimitError>().is_some() {
            ApiError::PayloadTooLarge { limit }
        } else {
            ApiError::UnreadableBody(axum::Error::new(e))
        }
    })?;
    Ok(collected.to_bytes())
}

/// Read both provider headers. A missing header is logged and left empty.
pub fn extract_provider_credentials(headers: &HeaderMap) -> ScopedCredentials {
    let read = |name: &str, label: &str| {
        match headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
        {
            Some(value) => Some(Credential::new(value)),
            None => {
                error!(
                    event = "provider_credential_missing",
                    header = name,
                    "{} missing in request headers",
                    label
                );
                None
            }
        }
    };

    ScopedCredentials {
        provider_api_key: read(PROVIDER_API_KEY_HEADER, "Google API key"),
        provider_client_id: read(PROVIDER_CLIENT_ID_HEADER, "Google CSI ID"),
    }
}
