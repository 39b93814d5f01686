//! # Configuration Management
//!
//! This module handles loading and saving client settings from a TOML file
//! (`worldtides.toml` by default). Every field is optional in the file; any
//! setting left out keeps its default.
//!
//! ```toml
//! api_key = "your-worldtides-key"
//! request_timeout_secs = 10
//! base_url = "https://www.worldtides.info"
//! ```
//!
//! Nothing is read from the environment; the file path is always chosen by
//! the caller.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::client::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};

const DEFAULT_CONFIG_PATH: &str = "worldtides.toml";

/// Failure to persist a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("config serialization: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Client configuration loaded from `worldtides.toml`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorldtidesConfig {
    /// API key sent as the `key` query parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Deadline for one complete request/response exchange
    pub request_timeout_secs: u64,
    /// Scheme and host of the API; the `/api/v3` path is appended
    pub base_url: String,
}

impl Default for WorldtidesConfig {
    fn default() -> Self {
        WorldtidesConfig {
            api_key: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl WorldtidesConfig {
    /// Load configuration from `worldtides.toml` in the working directory.
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<WorldtidesConfig>(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded Worldtides configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config file format, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save current configuration as pretty-printed TOML.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
