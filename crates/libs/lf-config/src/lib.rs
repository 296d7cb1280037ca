//! Configuration for the LLM Factory client.
//!
//! Provides types for locating the factory server and tuning the status
//! polling loop, loaded from TOML files or built from defaults.
//!
//! # Usage
//!
//! ```rust
//! use lf_config::FactoryConfig;
//!
//! let config = FactoryConfig::from_toml(r#"
//!     [server]
//!     base_url = "http://factory.local:8000/api"
//!
//!     [poll]
//!     interval_ms = 500
//! "#).unwrap();
//! assert_eq!(config.poll.interval_ms, 500);
//! ```

pub mod error;
pub mod prelude;

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::prelude::*;

/// Default base URL of the factory API.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Default delay between poll rounds, matching the service UI's cadence.
pub const DEFAULT_INTERVAL_MS: u64 = 750;

/// Server location settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the factory API, including the `/api` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Status polling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSettings {
    /// Delay between poll rounds in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Optional ceiling on the number of poll rounds. `None` polls until the
    /// job reaches a terminal status, however long that takes.
    #[serde(default)]
    pub max_rounds: Option<u64>,
}

/// Full client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryConfig {
    /// Server location settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Status polling settings.
    #[serde(default)]
    pub poll: PollSettings,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_rounds: None,
        }
    }
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            poll: PollSettings::default(),
        }
    }
}

impl PollSettings {
    /// The delay between poll rounds.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl FactoryConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(file_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(file_path)?;
        let config = Self::from_toml(&contents)?;
        info!("Loaded factory configuration from {}", file_path.display());
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(value: &str) -> Result<Self> {
        Ok(toml::from_str(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = FactoryConfig::default();
        assert_eq!(config.server.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.poll.interval_ms, DEFAULT_INTERVAL_MS);
        assert_eq!(config.poll.max_rounds, None);
        assert_eq!(config.poll.interval(), Duration::from_millis(750));
    }

    #[test]
    fn empty_toml_falls_back_to_defaults() {
        let config = FactoryConfig::from_toml("").unwrap();
        assert_eq!(config, FactoryConfig::default());
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() -> Result<()> {
        let config = FactoryConfig::from_toml(
            r#"
            [poll]
            max_rounds = 40
            "#,
        )?;
        assert_eq!(config.server.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.poll.interval_ms, DEFAULT_INTERVAL_MS);
        assert_eq!(config.poll.max_rounds, Some(40));
        Ok(())
    }

    #[test]
    fn from_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(
            file,
            r#"
            [server]
            base_url = "http://factory.local:9000/api"

            [poll]
            interval_ms = 250
            max_rounds = 10
            "#
        )?;
        let config = FactoryConfig::from_file(file.path())?;
        assert_eq!(config.server.base_url, "http://factory.local:9000/api");
        assert_eq!(config.poll.interval(), Duration::from_millis(250));
        assert_eq!(config.poll.max_rounds, Some(10));
        Ok(())
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(FactoryConfig::from_toml("[poll]\ninterval_ms = \"fast\"").is_err());
    }
}
