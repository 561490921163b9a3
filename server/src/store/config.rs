use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StorageConfig {
    Local { path: PathBuf },
}

impl StorageConfig {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::Local { path: path.into() }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let backend = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "local".to_string());

        match backend.as_str() {
            "local" => {
                let path = std::env::var("STORAGE_PATH").unwrap_or_else(|_| "./data".to_string());
                Ok(Self::local(path))
            }
            _ => anyhow::bail!("Unknown storage backend: {}. Must be 'local'", backend),
        }
    }
}

/// The paired backend collections for one logical artifact group:
/// current values in one, archived versions in the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionPair {
    pub current: String,
    pub history: String,
}

impl CollectionPair {
    pub fn new(current: impl Into<String>, history: impl Into<String>) -> Self {
        Self {
            current: current.into(),
            history: history.into(),
        }
    }

    pub fn from_env() -> Self {
        Self {
            current: std::env::var("CURRENT_COLLECTION")
                .unwrap_or_else(|_| "artifacts-current".to_string()),
            history: std::env::var("HISTORY_COLLECTION")
                .unwrap_or_else(|_| "artifacts-history".to_string()),
        }
    }
}

/// Tunables for history retention and write confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backups retained per artifact before age-based pruning kicks in.
    pub max_backup_files: usize,
    /// Backups beyond the count cap survive until at least this old.
    pub max_backup_hours: i64,
    pub confirm_poll_interval: Duration,
    pub confirm_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_backup_files: 10,
            max_backup_hours: 48,
            confirm_poll_interval: Duration::from_millis(300),
            confirm_timeout: Duration::from_secs(10),
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_backup_files: std::env::var("MAX_BACKUP_FILES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_backup_files),
            max_backup_hours: std::env::var("MAX_BACKUP_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_backup_hours),
            ..defaults
        }
    }
}
