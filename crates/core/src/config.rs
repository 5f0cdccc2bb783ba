//! Configuration via `sift.toml`
//!
//! On first use a default `sift.toml` can be written next to the data it
//! governs. To change settings, edit the file and reload.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "sift.toml";

/// Default lifetime of every result set, in seconds
pub const DEFAULT_RESULT_TTL_SECS: u64 = 30;

/// Default sweep interval of the TTL cleaner, in milliseconds
pub const DEFAULT_CLEANUP_INTERVAL_MS: u64 = 1000;

/// Search configuration loaded from `sift.toml`.
///
/// # Example
///
/// ```toml
/// result_ttl_secs = 30
/// cleanup_interval_ms = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiftConfig {
    /// Lifetime of intermediate and final result sets.
    #[serde(default = "default_result_ttl_secs")]
    pub result_ttl_secs: u64,
    /// How often the TTL cleaner reclaims expired keys.
    #[serde(default = "default_cleanup_interval_ms")]
    pub cleanup_interval_ms: u64,
}

fn default_result_ttl_secs() -> u64 {
    DEFAULT_RESULT_TTL_SECS
}

fn default_cleanup_interval_ms() -> u64 {
    DEFAULT_CLEANUP_INTERVAL_MS
}

impl Default for SiftConfig {
    fn default() -> Self {
        Self {
            result_ttl_secs: DEFAULT_RESULT_TTL_SECS,
            cleanup_interval_ms: DEFAULT_CLEANUP_INTERVAL_MS,
        }
    }
}

impl SiftConfig {
    /// TTL applied to every result set
    pub fn result_ttl(&self) -> Duration {
        Duration::from_secs(self.result_ttl_secs)
    }

    /// Sweep interval of the TTL cleaner
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }

    /// Reject settings the store cannot honour.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for a zero TTL or a zero sweep interval.
    pub fn validate(&self) -> Result<()> {
        if self.result_ttl_secs == 0 {
            return Err(Error::Config(
                "result_ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.cleanup_interval_ms == 0 {
            return Err(Error::Config(
                "cleanup_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Sift search configuration
#
# Lifetime in seconds of every intermediate and final result set.
# Callers that need results longer must extend the TTL themselves.
result_ttl_secs = 30

# How often (milliseconds) the in-memory store reclaims expired keys.
cleanup_interval_ms = 1000
"#
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: SiftConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
