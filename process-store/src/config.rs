//! Configuration for the RocksDB-backed store

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Process store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Data directory for RocksDB
    pub data_dir: PathBuf,

    /// RocksDB tuning
    pub rocksdb: RocksDbConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/processes"),
            rocksdb: RocksDbConfig::default(),
        }
    }
}

/// RocksDB tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocksDbConfig {
    /// Write buffer size (MB)
    pub write_buffer_size_mb: usize,

    /// Max write buffers
    pub max_write_buffer_number: i32,

    /// Max background jobs (compaction + flush)
    pub max_background_jobs: i32,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            write_buffer_size_mb: 64,
            max_write_buffer_number: 4,
            max_background_jobs: 2,
        }
    }
}

impl StoreConfig {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: StoreConfig = toml::from_str(&content)
            .map_err(|e| crate::StoreError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load defaults with environment overrides
    pub fn from_env() -> Self {
        let mut config = StoreConfig::default();

        if let Ok(dir) = std::env::var("CONNECTOR_STORE_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        config
    }
}
