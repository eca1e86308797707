//! Configuration loading and representation.

use std::path::PathBuf;

use crate::slot::FileSlot;
use crate::store::{JobStore, STORAGE_KEY};

pub const DATA_DIR_ENV: &str = "JOBTRACKER_DATA_DIR";
pub const STORAGE_KEY_ENV: &str = "JOBTRACKER_STORAGE_KEY";

/// Where and under which key the job collection is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub storage_key: String,
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            storage_key: STORAGE_KEY.to_string(),
        }
    }

    /// Load from `JOBTRACKER_DATA_DIR` / `JOBTRACKER_STORAGE_KEY`, with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`StoreConfig::from_env`] with an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = match lookup(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir(),
        };

        let storage_key = lookup(STORAGE_KEY_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| STORAGE_KEY.to_string());

        Self {
            data_dir,
            storage_key,
        }
    }

    pub fn slot(&self) -> FileSlot {
        FileSlot::new(&self.data_dir)
    }

    /// Initialize a file-backed store for this configuration.
    pub fn open_store(&self) -> JobStore<FileSlot> {
        JobStore::initialize_with_key(self.slot(), self.storage_key.clone())
    }
}

/// `{app_data_dir}/jobtracker`, or `./.jobtracker` when no data directory can
/// be resolved.
pub fn default_data_dir() -> PathBuf {
    match dirs::data_dir() {
        Some(mut dir) => {
            dir.push("jobtracker");
            dir
        }
        None => {
            tracing::warn!("could not resolve an app data directory; using ./.jobtracker");
            PathBuf::from(".jobtracker")
        }
    }
}
