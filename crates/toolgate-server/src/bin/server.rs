//! Toolgate server binary.

use anyhow::{bail, Result};
use toolgate_common_log::{LogConfig, LogFormat, LogLevel};
use toolgate_server::config::{load_config, validate_config};
use toolgate_server::{Server, ServerConfig};
use tracing::{error, info};

const LEVEL_VARS: [&str; 3] = ["TOOLGATE_LOG_LEVEL", "RUST_LOG", "LOG_LEVEL"];

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = load_config()?;

    toolgate_common_log::init(log_config(&config))?;

    if let Err(errors) = validate_config(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        bail!("{} configuration error(s)", errors.len());
    }

    info!("Starting toolgate server v{}", env!("CARGO_PKG_VERSION"));

    let server = Server::new(config)?;

    #[cfg(unix)]
    spawn_reload_on_hangup(&server);

    server.run().await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Environment wins; the config file fills in what it leaves unset.
fn log_config(config: &ServerConfig) -> LogConfig {
    let mut log = LogConfig::from_env();

    if !LEVEL_VARS.iter().any(|key| std::env::var(key).is_ok()) {
        if let Some(level) = LogLevel::parse(&config.logging.level) {
            log = log.with_level(level);
        }
    }
    if std::env::var("TOOLGATE_LOG_FORMAT").is_err() {
        log.format = LogFormat::parse(&config.logging.format);
    }

    log
}

/// Re-read the allow list on SIGHUP. A failed reload keeps the current list.
#[cfg(unix)]
fn spawn_reload_on_hangup(server: &Server) {
    use tokio::signal::unix::{signal, SignalKind};

    let allow_list = server.state().allow_list.clone();
    let path = server.state().config.access.keys_file_path.clone();

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(signal) => signal,
            Err(e) => {
                error!(error = %e, "Failed to install SIGHUP handler");
                return;
            }
        };

        while hangup.recv().await.is_some() {
            if let Err(e) = allow_list.reload(&path) {
                error!(error = %e, "Allow list reload failed, keeping previous list");
            }
        }
    });
}
