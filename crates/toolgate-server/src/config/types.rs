//! Server configuration types.

use serde::{Deserialize, Serialize};
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Main server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server binding configuration.
    pub server: ServerBindConfig,
    /// Access-key allow list.
    pub access: AccessConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Outbound search provider.
    pub search: SearchConfig,
    /// Default tool messages.
    #[serde(default)]
    pub messages: MessagesConfig,
}

/// Server binding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerBindConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest request body the credential-scoping stage will buffer.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Request timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_request_timeout() -> u64 {
    30
}

impl ServerBindConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Access control configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// JSON array of accepted access keys.
    #[serde(default = "default_keys_file_path")]
    pub keys_file_path: PathBuf,
}

fn default_keys_file_path() -> PathBuf {
    PathBuf::from("storage/access_keys.json")
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty or compact).
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Log buffered request bodies at trace level.
    #[serde(default)]
    pub trace_bodies: bool,
    /// Log presented access keys at trace level.
    #[serde(default)]
    pub trace_credentials: bool,
    /// Paths excluded from request logging.
    #[serde(default)]
    pub exclude_paths: Vec<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Search provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

fn default_search_endpoint() -> String {
    crate::tools::google::DEFAULT_SEARCH_ENDPOINT.to_string()
}

fn default_search_timeout() -> u64 {
    10
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Default tool messages configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesConfig {
    #[serde(default = "default_messages_file_path")]
    pub file_path: PathBuf,
}

fn default_messages_file_path() -> PathBuf {
    PathBuf::from("storage/default_tools_messages.json")
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            file_path: default_messages_file_path(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: ServerBindConfig {
                host: default_host(),
                port: default_port(),
                max_body_bytes: default_max_body_bytes(),
                request_timeout_secs: default_request_timeout(),
            },
            access: AccessConfig {
                keys_file_path: default_keys_file_path(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
                trace_bodies: false,
                trace_credentials: false,
                exclude_paths: vec!["/internal/health".to_string()],
            },
            search: SearchConfig {
                endpoint: default_search_endpoint(),
                timeout_secs: default_search_timeout(),
            },
            messages: MessagesConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig::default();
        assert_eq!(
            config.server.socket_addr().unwrap(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );

        let mut bad = config.server.clone();
        bad.host = "not a host".to_string();
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn test_sections_fill_in_defaults() {
        let config: ServerConfig = serde_json::from_value(serde_json::json!({
            "server": {},
            "access": {},
            "logging": {},
            "search": {}
        }))
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.access.keys_file_path,
            PathBuf::from("storage/access_keys.json")
        );
        assert_eq!(
            config.messages.file_path,
            PathBuf::from("storage/default_tools_messages.json")
        );
        assert!(!config.logging.trace_credentials);
        assert_eq!(config.search.timeout(), Duration::from_secs(10));
    }
}
