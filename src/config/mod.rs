//! Configuration management for `support_tickets`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. Environment-style pairs (`SUPPORT_TICKETS_DB`, `SUPPORT_TICKETS_BUSY_TIMEOUT_MS`)
//! 2. YAML config file (`db_path`, `busy_timeout_ms`)
//! 3. Defaults
//!
//! The crate never reads the process environment itself; a caller that wants
//! env overrides passes `std::env::vars()` to [`StoreConfig::load`].

use crate::error::{Result, TicketError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Database file used when nothing else is configured.
pub const DEFAULT_DB_FILENAME: &str = "support_tickets.db";
/// How long a connection waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

pub const ENV_DB_PATH: &str = "SUPPORT_TICKETS_DB";
pub const ENV_BUSY_TIMEOUT_MS: &str = "SUPPORT_TICKETS_BUSY_TIMEOUT_MS";

/// Resolved store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILENAME),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Apply layers in precedence order (lowest to highest) over the defaults.
    #[must_use]
    pub fn from_layers(layers: &[ConfigLayer]) -> Self {
        let merged = ConfigLayer::merge_layers(layers);
        let defaults = Self::default();
        Self {
            db_path: merged.db_path.unwrap_or(defaults.db_path),
            busy_timeout_ms: merged.busy_timeout_ms.unwrap_or(defaults.busy_timeout_ms),
        }
    }

    /// Load configuration from an optional YAML file and caller-supplied
    /// `(name, value)` pairs, e.g. `std::env::vars()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or a
    /// recognized variable has a malformed value.
    pub fn load<I, K, V>(config_file: Option<&Path>, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let file_layer = match config_file {
            Some(path) => ConfigLayer::from_yaml(path)?,
            None => ConfigLayer::default(),
        };
        let env_layer = ConfigLayer::from_env_vars(vars)?;
        Ok(Self::from_layers(&[file_layer, env_layer]))
    }
}

/// One partial configuration source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    pub db_path: Option<PathBuf>,
    pub busy_timeout_ms: Option<u64>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        if let Some(path) = &other.db_path {
            self.db_path = Some(path.clone());
        }
        if let Some(ms) = other.busy_timeout_ms {
            self.busy_timeout_ms = Some(ms);
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parse a layer from YAML text. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML for this layer.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Build a layer from explicit `(name, value)` pairs. Blank values are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a recognized variable has a malformed value.
    pub fn from_env_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut layer = Self::default();

        for (key, value) in vars {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                ENV_DB_PATH => layer.db_path = Some(PathBuf::from(value)),
                ENV_BUSY_TIMEOUT_MS => {
                    let ms = value.parse::<u64>().map_err(|_| {
                        TicketError::Config(format!(
                            "{ENV_BUSY_TIMEOUT_MS} must be a whole number of milliseconds, got {value:?}"
                        ))
                    })?;
                    layer.busy_timeout_ms = Some(ms);
                }
                _ => {}
            }
        }

        Ok(layer)
    }
}
