//! Access-control middleware layer.

use crate::{
    access::AccessKeyValidator,
    context::{AccessDecision, DenialReason, RequestContext},
    middleware::{RequestId, ACCESS_KEY_HEADER},
    secret::Credential,
};
use axum::{
    body::Body,
    http::{HeaderMap, Request},
    response::Response,
};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{debug, trace, warn, Span};

/// Records an [`AccessDecision`] for every request and always forwards it.
#[derive(Clone)]
pub struct AccessControlLayer {
    validator: Arc<dyn AccessKeyValidator>,
    trace_credentials: bool,
}

impl AccessControlLayer {
    /// Create the layer around an injected validator.
    pub fn new(validator: impl AccessKeyValidator) -> Self {
        Self {
            validator: Arc::new(validator),
            trace_credentials: false,
        }
    }

    /// Emit the presented key at TRACE level. Off unless explicitly
    /// configured.
    pub fn with_credential_tracing(mut self, enabled: bool) -> Self {
        self.trace_credentials = enabled;
        self
    }
}

impl<S> Layer<S> for AccessControlLayer {
    type Service = AccessControlMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AccessControlMiddleware {
            inner,
            validator: self.validator.clone(),
            trace_credentials: self.trace_credentials,
        }
    }
}

/// Access-control middleware service.
#[derive(Clone)]
pub struct AccessControlMiddleware<S> {
    inner: S,
    validator: Arc<dyn AccessKeyValidator>,
    trace_credentials: bool,
}

impl<S> Service<Request<Body>> for AccessControlMiddleware<S>
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

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let validator = self.validator.clone();
        let trace_credentials = self.trace_credentials;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let decision = decide(req.headers(), validator.as_ref(), trace_credentials);
            Span::current().record("granted", decision.is_granted());

            let mut context = req
                .extensions_mut()
                .remove::<RequestContext>()
                .unwrap_or_else(|| match req.extensions().get::<RequestId>() {
                    Some(id) => RequestContext::with_request_id(id.as_str()),
                    None => RequestContext::new(),
                });
            if let Err(err) = context.record_decision(decision) {
                warn!(error = %err, "Access decision already present, keeping the first one");
            }
            req.extensions_mut().insert(context);

            // Fail-forward: rejection happens at the privileged call site.
            inner.call(req).await
        })
    }
}

/// Build the decision for one request's headers.
pub fn decide(
    headers: &HeaderMap,
    validator: &dyn AccessKeyValidator,
    trace_credentials: bool,
) -> AccessDecision {
    let presented = match headers.get(ACCESS_KEY_HEADER) {
        None => None,
        // Header values that are not visible ASCII can never match a key.
        Some(value) => Some(value.to_str().ok()),
    };

    match presented {
        None | Some(Some("")) => {
            warn!(
                event = "access_denied",
                reason = DenialReason::MissingCredential.as_str(),
                "{} missing in request headers",
                ACCESS_KEY_HEADER
            );
            AccessDecision::denied(DenialReason::MissingCredential)
        }
        Some(key) => {
            if trace_credentials {
                trace!(presented_key = ?key, "Validating access key");
            }

            match key {
                Some(key) if validator.validate(Some(key)) => {
                    debug!(event = "access_granted", "Access granted");
                    AccessDecision::granted(Credential::new(key))
                }
                _ => {
                    warn!(
                        event = "access_denied",
                        reason = DenialReason::InvalidCredential.as_str(),
                        "Invalid access key provided"
                    );
                    AccessDecision::denied(DenialReason::InvalidCredential)
                }
            }
        }
    }
}
