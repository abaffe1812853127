//! Request logging middleware.

use super::redaction::redact_headers;
use crate::middleware::RequestId;
use axum::{body::Body, http::Request, response::Response};
use futures::future::BoxFuture;
use std::task::{Context, Poll};
use toolgate_common_log::spans::{request_span, Timer};
use tower::{Layer, Service};
use tracing::{debug, info, Instrument};
use uuid::Uuid;

/// Request logging layer.
#[derive(Clone, Default)]
pub struct LoggingLayer {
    config: LoggingConfig,
}

#[derive(Clone, Default)]
pub struct LoggingConfig {
    /// Paths to exclude from logging.
    pub exclude_paths: Vec<String>,
    /// Extra headers to redact on top of the built-in list.
    pub redact_headers: Vec<String>,
}

impl LoggingLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LoggingConfig) -> Self {
        Self { config }
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingMiddleware {
            inner,
            config: self.config.clone(),
        }
    }
}

#[derive(Clone)]
pub struct LoggingMiddleware<S> {
    inner: S,
    config: LoggingConfig,
}

impl<S> Service<Request<Body>> for LoggingMiddleware<S>
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
        let config = self.config.clone();
        let mut inner = self.inner.clone();

        // Get or generate request ID
        let request_id = req
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        req.extensions_mut().insert(RequestId::new(request_id.clone()));

        let path = req.uri().path().to_string();
        if config.exclude_paths.iter().any(|p| path.starts_with(p)) {
            return Box::pin(async move { inner.call(req).await });
        }

        let span = request_span(&request_id, req.method().as_str(), &path);

        Box::pin(
            async move {
                info!(
                    event = "request_started",
                    version = ?req.version(),
                    user_agent = req
                        .headers()
                        .get("user-agent")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default(),
                );
                debug!(headers = ?redact_headers(req.headers(), &config.redact_headers), "Request headers");

                let timer = Timer::start();
                let response = inner.call(req).await?;

                let status = response.status();
                tracing::Span::current().record("status", status.as_u16());
                info!(
                    event = "request_completed",
                    status = status.as_u16(),
                    duration_ms = timer.elapsed_ms(),
                );

                Ok(response)
            }
            .instrument(span),
        )
    }
}
