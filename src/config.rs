//! Configuration file support.
//!
//! ```toml
//! [history]
//! default_limit = 50
//! max_limit = 100
//!
//! [log]
//! filter = "info"
//! ```
//!
//! Every key is optional.

use crate::store::{DEFAULT_LIMIT, MAX_LIMIT};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Errors raised while loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying failure
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`Config`]
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// File that was parsed
        path: PathBuf,
        /// Underlying failure
        source: toml::de::Error,
    },
    /// The values parse but do not make sense together
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// History paging
    pub history: HistoryConfig,
    /// Logging
    pub log: LogConfig,
}

/// `[history]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Page size when a request gives none
    pub default_limit: usize,
    /// Largest page size a request may ask for, at most 100
    pub max_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

/// `[log]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directives, used when `RUST_LOG` is
    /// not set
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
        }
    }
}

impl Config {
    /// Load the configuration at `path`, or the defaults when no path is
    /// given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path,
            None => return Ok(Self::default()),
        };
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Check the values against each other and against the store limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        let history = &self.history;
        if history.max_limit == 0 || history.max_limit > MAX_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "history.max_limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }
        if history.default_limit == 0 || history.default_limit > history.max_limit {
            return Err(ConfigError::Invalid(
                "history.default_limit must be between 1 and history.max_limit".into(),
            ));
        }
        Ok(())
    }
}
