//! Configuration validation.

use super::types::ServerConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid port: {0}")]
    InvalidPort(u16),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("Access keys file path must not be empty")]
    EmptyKeysPath,

    #[error("Invalid search endpoint: {0}")]
    InvalidSearchEndpoint(String),

    #[error("Request body limit must be greater than zero")]
    InvalidBodyLimit,
}

/// Validate server configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push(ConfigError::InvalidPort(0));
    }

    if config.server.max_body_bytes == 0 {
        errors.push(ConfigError::InvalidBodyLimit);
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.to_lowercase().as_str()) {
        errors.push(ConfigError::InvalidLogLevel(config.logging.level.clone()));
    }

    if config.access.keys_file_path.as_os_str().is_empty() {
        errors.push(ConfigError::EmptyKeysPath);
    }

    let endpoint = &config.search.endpoint;
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        errors.push(ConfigError::InvalidSearchEndpoint(endpoint.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_port() {
        let mut config = ServerConfig::default();
        config.server.port = 0;

        let result = validate_config(&config);
        assert!(result.unwrap_err().iter().any(|e| matches!(e, ConfigError::InvalidPort(0))));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = ServerConfig::default();
        config.logging.level = "loud".to_string();

        let result = validate_config(&config);
        assert!(result
            .unwrap_err()
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidLogLevel(_))));
    }

    #[test]
    fn test_errors_are_collected() {
        let mut config = ServerConfig::default();
        config.access.keys_file_path = PathBuf::new();
        config.search.endpoint = "ftp://example.com".to_string();
        config.server.max_body_bytes = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| matches!(e, ConfigError::EmptyKeysPath)));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidSearchEndpoint(_))));
        assert!(errors.iter().any(|e| matches!(e, ConfigError::InvalidBodyLimit)));
    }
}
