//! Application state shared by all handlers.

use crate::access::SharedAllowList;
use crate::config::ServerConfig;
use crate::messages::DefaultToolMessages;
use crate::tools::google::GoogleSearchConfig;
use crate::tools::{GoogleSearchClient, SearchGoogleTool, SearchProvider, ToolRegistry};
use std::sync::Arc;

/// Shared application state.
///
/// Everything here is either immutable after startup or, for the allow
/// list, swapped atomically. Nothing request-specific lives here.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub allow_list: SharedAllowList,
    pub tools: Arc<ToolRegistry>,
    pub messages: Arc<DefaultToolMessages>,
}

impl AppState {
    /// Build state from configuration, talking to the configured search
    /// endpoint.
    pub fn new(config: &ServerConfig) -> Result<Self, anyhow::Error> {
        let client = GoogleSearchClient::new(GoogleSearchConfig {
            endpoint: config.search.endpoint.clone(),
            timeout: config.search.timeout(),
            ..Default::default()
        })?;
        Ok(Self::with_provider(config, Arc::new(client)))
    }

    /// Build state with an explicit search provider.
    pub fn with_provider(config: &ServerConfig, provider: Arc<dyn SearchProvider>) -> Self {
        let tools = ToolRegistry::new().register(SearchGoogleTool::new(provider));

        Self {
            config: Arc::new(config.clone()),
            allow_list: SharedAllowList::from_path(&config.access.keys_file_path),
            tools: Arc::new(tools),
            messages: Arc::new(DefaultToolMessages::load_or_empty(
                &config.messages.file_path,
            )),
        }
    }
}
