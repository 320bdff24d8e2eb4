//! Loader configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{LoadError, Result};

/// Writes in flight per collection when nothing else is configured
pub const DEFAULT_CONCURRENCY: usize = 3;

/// Loader configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Destination table name
    pub table_name: String,
    /// Writes in flight per collection
    pub concurrency: usize,
    /// Timeout for a single write, in milliseconds
    pub write_timeout_ms: Option<u64>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            table_name: "electro".to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            write_timeout_ms: None,
        }
    }
}

impl LoaderConfig {
    /// Parse and validate configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Reject an empty table name, zero concurrency and a zero write timeout
    pub fn validate(&self) -> Result<()> {
        if self.table_name.trim().is_empty() {
            return Err(LoadError::Config("table_name must not be empty".to_string()));
        }
        if self.concurrency == 0 {
            return Err(LoadError::Config("concurrency must be at least 1".to_string()));
        }
        if self.write_timeout_ms == Some(0) {
            return Err(LoadError::Config(
                "write_timeout_ms must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Write timeout as a [`Duration`]
    pub fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout_ms.map(Duration::from_millis)
    }
}
