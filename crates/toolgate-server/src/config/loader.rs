//! Configuration loading utilities.

use super::types::ServerConfig;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Flat variable that points at the allow-list file. Wins over every other
/// source for `access.keys_file_path`.
pub const ACCESS_KEYS_FILE_PATH_ENV: &str = "ACCESS_KEYS_FILE_PATH";

/// Prefix for nested overrides, e.g. `TOOLGATE__SERVER__PORT`.
pub const ENV_PREFIX: &str = "TOOLGATE";

/// Load configuration from various sources.
pub struct ConfigLoader {
    config_path: Option<String>,
    env_source: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_source: None,
        }
    }

    /// Set config file path.
    pub fn with_config_path(mut self, path: impl Into<String>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Read variables from `vars` instead of the process environment.
    pub fn with_env_source(mut self, vars: HashMap<String, String>) -> Self {
        self.env_source = Some(vars);
        self
    }

    fn env_var(&self, name: &str) -> Option<String> {
        match &self.env_source {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        }
    }

    /// Load configuration.
    pub fn load(&self) -> Result<ServerConfig> {
        let mut builder = config::Config::builder();

        // Add default values
        builder = builder.add_source(config::File::from_str(
            include_str!("defaults.toml"),
            config::FileFormat::Toml,
        ));

        // Add config file if specified
        if let Some(path) = &self.config_path {
            if Path::new(path).exists() {
                info!(path = %path, "Loading config file");
                builder = builder.add_source(config::File::with_name(path));
            }
        }

        // Add environment variables
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(self.env_source.clone()),
        );

        let keys_path = self.env_var(ACCESS_KEYS_FILE_PATH_ENV);
        if let Some(path) = &keys_path {
            info!(path = %path, "Allow-list path taken from {}", ACCESS_KEYS_FILE_PATH_ENV);
        }
        builder = builder
            .set_override_option("access.keys_file_path", keys_path)
            .context("Failed to apply allow-list path override")?;

        let config = builder
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Load configuration from environment.
pub fn load_config() -> Result<ServerConfig> {
    let config_path = std::env::var("CONFIG_PATH").ok();

    let mut loader = ConfigLoader::new();
    if let Some(path) = config_path {
        loader = loader.with_config_path(path);
    }

    loader.load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::Builder;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = ConfigLoader::new()
            .with_env_source(HashMap::new())
            .load()
            .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert_eq!(
            config.access.keys_file_path,
            PathBuf::from("storage/access_keys.json")
        );
        assert_eq!(
            config.search.endpoint,
            "https://www.googleapis.com/customsearch/v1"
        );
    }

    #[test]
    fn test_prefixed_env_overrides_defaults() {
        let config = ConfigLoader::new()
            .with_env_source(env(&[
                ("TOOLGATE__SERVER__PORT", "9090"),
                ("TOOLGATE__LOGGING__TRACE_BODIES", "true"),
            ]))
            .load()
            .unwrap();
        assert_eq!(config.server.port, 9090);
        assert!(config.logging.trace_bodies);
    }

    #[test]
    fn test_flat_keys_path_wins() {
        let config = ConfigLoader::new()
            .with_env_source(env(&[
                ("TOOLGATE__ACCESS__KEYS_FILE_PATH", "/etc/a.json"),
                (ACCESS_KEYS_FILE_PATH_ENV, "/etc/b.json"),
            ]))
            .load()
            .unwrap();
        assert_eq!(config.access.keys_file_path, PathBuf::from("/etc/b.json"));
    }

    #[test]
    fn test_config_file_layer() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[search]\nendpoint = \"http://localhost:9999/search\"").unwrap();

        let config = ConfigLoader::new()
            .with_config_path(file.path().to_string_lossy())
            .with_env_source(HashMap::new())
            .load()
            .unwrap();
        assert_eq!(config.search.endpoint, "http://localhost:9999/search");
        assert_eq!(config.search.timeout_secs, 10);
    }
}
