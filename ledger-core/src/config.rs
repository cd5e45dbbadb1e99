//! Configuration for the ledger

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory for RocksDB
    pub data_dir: PathBuf,

    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// RocksDB configuration
    pub rocksdb: RocksDbConfig,

    /// Storage operation limits
    pub storage: StorageConfig,

    /// Where returned waste flows
    pub return_policy: ReturnPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/ledger"),
            service_name: "waste-ledger-core".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            rocksdb: RocksDbConfig::default(),
            storage: StorageConfig::default(),
            return_policy: ReturnPolicy::TerminalSink,
        }
    }
}

/// Convention for the target of a `return` entry.
///
/// The terminal-sink convention is the primary one; targeted disposal is
/// kept as a policy switch rather than hard-coded away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnPolicy {
    /// Returns carry no target; waste simply exits circulation
    TerminalSink,
    /// Returns name a disposal-sink account; it is recorded but receives no stock
    Targeted,
}

/// RocksDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocksDbConfig {
    /// Write buffer size (MB)
    pub write_buffer_size_mb: usize,

    /// Max write buffers
    pub max_write_buffer_number: i32,

    /// Max background jobs (compaction + flush)
    pub max_background_jobs: i32,

    /// Enable statistics
    pub enable_statistics: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            write_buffer_size_mb: 64,
            max_write_buffer_number: 4,
            max_background_jobs: 4,
            enable_statistics: false,
        }
    }
}

/// Storage operation limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Deadline for a single submit/reverse, in milliseconds.
    /// Exceeding it before the commit point fails the operation with
    /// `StorageTimeout` and leaves no partial state.
    pub op_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { op_timeout_ms: 2_000 }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(data_dir) = std::env::var("LEDGER_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(timeout) = std::env::var("LEDGER_OP_TIMEOUT_MS") {
            config.storage.op_timeout_ms = timeout.parse().map_err(|_| {
                crate::Error::Config("LEDGER_OP_TIMEOUT_MS must be an integer".to_string())
            })?;
        }

        if let Ok(policy) = std::env::var("LEDGER_RETURN_POLICY") {
            config.return_policy = match policy.as_str() {
                "terminal_sink" => ReturnPolicy::TerminalSink,
                "targeted" => ReturnPolicy::Targeted,
                other => {
                    return Err(crate::Error::Config(format!(
                        "Unknown return policy: {}",
                        other
                    )))
                }
            };
        }

        Ok(config)
    }
}
