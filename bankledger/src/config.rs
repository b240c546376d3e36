//! Configuration for the ledger

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory for the store
    pub data_dir: PathBuf,

    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// RocksDB configuration
    pub rocksdb: RocksDbConfig,

    /// Transaction configuration
    pub txn: TxnConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/bankledger"),
            service_name: "bankledger".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            rocksdb: RocksDbConfig::default(),
            txn: TxnConfig::default(),
        }
    }
}

/// RocksDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocksDbConfig {
    /// Write buffer size (MB)
    pub write_buffer_size_mb: usize,

    /// Max write buffers
    pub max_write_buffer_number: i32,

    /// Target file size (MB)
    pub target_file_size_mb: u64,

    /// Max background jobs (compaction + flush)
    pub max_background_jobs: i32,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            write_buffer_size_mb: 64,
            max_write_buffer_number: 4,
            target_file_size_mb: 64,
            max_background_jobs: 4,
        }
    }
}

/// Transaction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxnConfig {
    /// How many times a unit of work is re-run after a lock or commit
    /// conflict before the conflict is surfaced to the caller
    pub max_attempts: u32,

    /// Per-key lock wait before a conflicting transaction gives up (ms)
    pub lock_timeout_ms: i64,
}

impl Default for TxnConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            lock_timeout_ms: 250,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    ///
    /// Recognized: `BANKLEDGER_DATA_DIR`, `BANKLEDGER_TXN_MAX_ATTEMPTS`,
    /// `BANKLEDGER_TXN_LOCK_TIMEOUT_MS`,
    /// `BANKLEDGER_ROCKSDB_WRITE_BUFFER_SIZE_MB`,
    /// `BANKLEDGER_ROCKSDB_MAX_WRITE_BUFFER_NUMBER`,
    /// `BANKLEDGER_ROCKSDB_TARGET_FILE_SIZE_MB`,
    /// `BANKLEDGER_ROCKSDB_MAX_BACKGROUND_JOBS`. Unset variables keep
    /// their defaults.
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(data_dir) = std::env::var("BANKLEDGER_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Some(v) = env_parse("BANKLEDGER_TXN_MAX_ATTEMPTS")? {
            config.txn.max_attempts = v;
        }
        if let Some(v) = env_parse("BANKLEDGER_TXN_LOCK_TIMEOUT_MS")? {
            config.txn.lock_timeout_ms = v;
        }
        if let Some(v) = env_parse("BANKLEDGER_ROCKSDB_WRITE_BUFFER_SIZE_MB")? {
            config.rocksdb.write_buffer_size_mb = v;
        }
        if let Some(v) = env_parse("BANKLEDGER_ROCKSDB_MAX_WRITE_BUFFER_NUMBER")? {
            config.rocksdb.max_write_buffer_number = v;
        }
        if let Some(v) = env_parse("BANKLEDGER_ROCKSDB_TARGET_FILE_SIZE_MB")? {
            config.rocksdb.target_file_size_mb = v;
        }
        if let Some(v) = env_parse("BANKLEDGER_ROCKSDB_MAX_BACKGROUND_JOBS")? {
            config.rocksdb.max_background_jobs = v;
        }

        Ok(config)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> crate::Result<Option<T>> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| crate::Error::Config(format!("{} must be a number", name))),
        Err(_) => Ok(None),
    }
}
