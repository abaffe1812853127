//! Toolgate server
//!
//! An HTTP gateway that exposes tools over JSON-RPC behind an access-key
//! gate.
//!
//! # Architecture
//!
//! - **Middleware**: a priority-ordered chain that logs, records an access
//!   decision and stages provider credentials. It never rejects a request on
//!   access grounds.
//! - **Gate**: privileged tools call [`gate::authorize`] first and return an
//!   error envelope when the recorded decision is negative.
//! - **Tools**: the JSON-RPC endpoint at `/mcp` dispatches to a
//!   [`tools::ToolRegistry`].
//!
//! Public routes such as `/default-tools-messages` and `/internal/health`
//! stay reachable without a key.

#![warn(clippy::all)]

pub mod access;
pub mod config;
pub mod context;
pub mod error;
pub mod gate;
pub mod mcp;
pub mod messages;
pub mod middleware;
pub mod routes;
pub mod secret;
pub mod state;
pub mod tools;

pub use config::ServerConfig;
pub use context::RequestContext;
pub use error::ApiError;
pub use secret::Credential;
pub use state::AppState;

use anyhow::Context as _;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Server builder for constructing and running the API server.
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Create a new server with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self, anyhow::Error> {
        let state = AppState::new(&config)?;
        Ok(Self { config, state })
    }

    /// Create a server around prebuilt state.
    pub fn with_state(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Shared state, e.g. to reload the allow list.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        routes::create_router(self.state.clone())
    }

    /// Run the server, binding to the configured address.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let addr = self.addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        info!(
            %addr,
            access_keys = self.state.allow_list.snapshot().len(),
            "Server listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }

    /// Get the server's socket address.
    pub fn addr(&self) -> Result<SocketAddr, anyhow::Error> {
        self.config
            .server
            .socket_addr()
            .context("Invalid server host/port")
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
