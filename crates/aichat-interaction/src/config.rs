//! Configuration file management for aichat.
//!
//! Reads `~/.config/aichat/config.toml`; environment variables override file
//! values. Priority: environment > config file > defaults.

use aichat_core::config::SessionSettings;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/aiassistant";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "AICHAT_API_URL";
pub const ENV_ACCESS_TOKEN: &str = "AICHAT_ACCESS_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "AICHAT_TIMEOUT_SECS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("Failed to read configuration file at {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse configuration file at {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Root structure of config.toml
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL including the assistant prefix, without trailing slash
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Static token for non-interactive use; normally supplied by the auth layer
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub session: SessionSettings,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            access_token: None,
            session: SessionSettings::default(),
        }
    }
}

impl ClientConfig {
    /// Loads the default config file (if present) and applies environment
    /// overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = get_config_path()?;
        let mut config = Self::from_file_or_default(&path)?;
        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Reads `path`; a missing file yields the defaults.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Overrides fields from `lookup` (the process environment in
    /// [`ClientConfig::load`]).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(token) = lookup(ENV_ACCESS_TOKEN) {
            self.access_token = Some(token).filter(|t| !t.trim().is_empty());
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs = timeout.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: ENV_TIMEOUT_SECS,
                    message: e.to_string(),
                }
            })?;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `api_url` without trailing slashes.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

/// Returns the path to the configuration file: ~/.config/aichat/config.toml
pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".config").join("aichat").join("config.toml"))
}
