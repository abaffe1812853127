//! Route configuration for the toolgate server.

mod internal;
mod messages;

pub use messages::DEFAULT_LANGUAGE;

use crate::{
    error::ApiError,
    mcp::handle_mcp,
    middleware::{
        AccessControlLayer, CredentialScopingLayer, LoggingConfig, LoggingLayer, MiddlewareChain,
        ACCESS_CONTROL_PRIORITY, CREDENTIAL_SCOPING_PRIORITY, LOGGING_PRIORITY,
    },
    state::AppState,
};
use axum::{extract::DefaultBodyLimit, http::Uri, routing::post, Router};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer};

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let common_middleware = ServiceBuilder::new()
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(DefaultBodyLimit::max(config.server.max_body_bytes));

    let app = Router::new()
        .route("/mcp", post(handle_mcp))
        .merge(messages::router())
        .nest("/internal", internal::router())
        .fallback(fallback_handler)
        .with_state(state.clone());

    default_chain(&state)
        .apply(app)
        .layer(common_middleware)
}

/// Request logging, then access control, then credential scoping.
pub fn default_chain(state: &AppState) -> MiddlewareChain {
    let config = &state.config;

    let logging = LoggingLayer::with_config(LoggingConfig {
        exclude_paths: config.logging.exclude_paths.clone(),
        redact_headers: Vec::new(),
    });
    let access = AccessControlLayer::new(state.allow_list.clone())
        .with_credential_tracing(config.logging.trace_credentials);
    let scoping = CredentialScopingLayer::new()
        .with_max_body_bytes(config.server.max_body_bytes)
        .with_body_tracing(config.logging.trace_bodies);

    MiddlewareChain::new()
        .register("request_logging", LOGGING_PRIORITY, logging)
        .register("access_control", ACCESS_CONTROL_PRIORITY, access)
        .register("credential_scoping", CREDENTIAL_SCOPING_PRIORITY, scoping)
}

async fn fallback_handler(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("Route {}", uri.path()))
}
