//! Allow list of valid access keys.

use arc_swap::ArcSwap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{error, info};

/// Failure to read the allow-list file.
#[derive(Debug, Error)]
pub enum AllowListError {
    #[error("failed to read access keys file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("access keys file {path} is not a JSON array of strings")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Immutable set of access keys.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    keys: HashSet<String>,
}

impl AllowList {
    pub fn from_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Empty list; denies everything.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the JSON array at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AllowListError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| AllowListError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let keys: Vec<String> =
            serde_json::from_str(&raw).map_err(|source| AllowListError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_keys(keys))
    }

    /// Like [`AllowList::load`] but fails closed: any load error is logged
    /// and an empty list is returned.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(list) => {
                info!(
                    path = %path.as_ref().display(),
                    keys = list.len(),
                    "Loaded access keys"
                );
                list
            }
            Err(err) => {
                error!(
                    event = "allow_list_load_failed",
                    error = %err,
                    cause = ?std::error::Error::source(&err).map(|e| e.to_string()),
                    "Failed to load access keys, denying all access"
                );
                Self::empty()
            }
        }
    }

    /// Membership test. Every entry is compared in constant time so the
    /// response time does not reveal how close a guess was.
    pub fn contains(&self, candidate: &str) -> bool {
        let candidate = candidate.as_bytes();
        self.keys.iter().fold(false, |found, key| {
            let matched: bool = key.as_bytes().ct_eq(candidate).into();
            found | matched
        })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Process-wide handle to the current allow list.
///
/// Reads are lock-free snapshots; [`SharedAllowList::reload`] swaps in a new
/// list atomically.
#[derive(Debug, Clone)]
pub struct SharedAllowList {
    current: Arc<ArcSwap<AllowList>>,
}

impl SharedAllowList {
    pub fn new(list: AllowList) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(list)),
        }
    }

    /// Load from `path`, failing closed.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::new(AllowList::load_or_empty(path))
    }

    pub fn snapshot(&self) -> Arc<AllowList> {
        self.current.load_full()
    }

    /// Re-read `path`. On failure the previous list stays active.
    pub fn reload(&self, path: impl AsRef<Path>) -> Result<usize, AllowListError> {
        let list = AllowList::load(path.as_ref())?;
        let count = list.len();
        self.current.store(Arc::new(list));
        info!(
            event = "allow_list_reloaded",
            path = %path.as_ref().display(),
            keys = count,
            "Access keys reloaded"
        );
        Ok(count)
    }
}

impl Default for SharedAllowList {
    fn default() -> Self {
        Self::new(AllowList::empty())
    }
}
