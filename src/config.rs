//! TOML-based user configuration.
//!
//! Stored at `<config_dir>/periodical/config.toml`. Every field has a
//! default, so a missing file or a partial one is fine.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::locale::Language;
use crate::validation::FillPolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("config directory not found")]
    NoConfigDir,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub language: Language,
    /// Overrides the default marked-dates file location.
    #[serde(default)]
    pub data_file: Option<PathBuf>,
    /// Kept last: it serializes as a TOML table.
    #[serde(default)]
    pub fill_policy: FillPolicy,
}

impl Config {
    /// Load from the default location, falling back to defaults if absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Like [`load`](Self::load), but a file that fails to parse yields
    /// defaults so it can be overwritten.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Self::load_or_default_from(&Self::path()?)
    }

    pub fn load_or_default_from(path: &Path) -> Result<Self, ConfigError> {
        match Self::load_from(path) {
            Err(ConfigError::Parse(e)) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("periodical")
            .join("config.toml"))
    }
}
