//! Localized default tool messages.

use serde_json::{Map, Value};
use std::path::Path;
use tracing::{error, info};

/// Language code to message object, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct DefaultToolMessages {
    by_language: Map<String, Value>,
}

impl DefaultToolMessages {
    pub fn from_map(by_language: Map<String, Value>) -> Self {
        Self { by_language }
    }

    /// Load from a JSON object file. A missing or malformed file is logged
    /// and yields an empty set.
    pub fn load_or_empty(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to read default tool messages");
                return Self::default();
            }
        };

        match serde_json::from_str::<Map<String, Value>>(&raw) {
            Ok(by_language) => {
                info!(
                    path = %path.display(),
                    languages = by_language.len(),
                    "Loaded default tool messages"
                );
                Self { by_language }
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Malformed default tool messages");
                Self::default()
            }
        }
    }

    /// Messages for `lang`, or an empty object when unknown.
    pub fn for_language(&self, lang: &str) -> Value {
        self.by_language
            .get(lang)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.by_language.keys().map(String::as_str)
    }
}
