use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

use crate::constants::{
    REGRESSIVOS_API_URL, REGRESSIVOS_HOME, REGRESSIVOS_HTTP_CONNECT_TIMEOUT_SECS,
    REGRESSIVOS_HTTP_REQUEST_TIMEOUT_SECS, REGRESSIVOS_REFRESH_INTERVAL_SECS,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 5;
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 300;

const CONFIG_FILE: &str = "config.toml";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidNumber { var: String, value: String },
    #[error("Invalid base URL: {0} (must start with http:// or https://)")]
    InvalidBaseUrl(String),
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
    #[error("Failed to read config: {0}")]
    Read(String),
    #[error("Invalid config format: {0}")]
    Parse(String),
    #[error("Failed to write config: {0}")]
    Write(String),
}

/// Directory holding the console's local state. `REGRESSIVOS_HOME` wins over
/// `~/.regressivos`.
pub fn regressivos_home() -> PathBuf {
    if let Ok(home) = env::var(REGRESSIVOS_HOME) {
        if !home.trim().is_empty() {
            return PathBuf::from(home);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".regressivos")
}

/// Console settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Backend base URL, without trailing slash
    pub base_url: String,

    pub request_timeout_secs: u64,

    pub connect_timeout_secs: u64,

    /// Live view refresh period
    pub refresh_interval_secs: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
        }
    }
}

impl ConsoleConfig {
    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        regressivos_home().join(CONFIG_FILE)
    }

    /// Defaults, then the config file, then environment overrides.
    pub async fn load() -> ConfigResult<Self> {
        Self::load_with_base_url(None).await
    }

    /// Like [`ConsoleConfig::load`], with an explicit base URL (the `--api-url`
    /// flag) layered on top before validating.
    pub async fn load_with_base_url(base_url: Option<String>) -> ConfigResult<Self> {
        let mut config = Self::load_from(&Self::config_path()).await?;
        config.apply_env()?;
        if let Some(url) = base_url {
            config = config.with_base_url(url);
        }
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file. A missing file yields the defaults.
    pub async fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Read(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to disk
    pub async fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::Write(e.to_string()))?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Write(e.to_string()))?;

        fs::write(path, content)
            .await
            .map_err(|e| ConfigError::Write(e.to_string()))
    }

    /// Applies `REGRESSIVOS_*` environment overrides.
    pub fn apply_env(&mut self) -> ConfigResult<()> {
        if let Ok(url) = env::var(REGRESSIVOS_API_URL) {
            if !url.trim().is_empty() {
                self.base_url = url;
            }
        }

        if let Some(secs) = env_u64(REGRESSIVOS_HTTP_REQUEST_TIMEOUT_SECS)? {
            self.request_timeout_secs = secs;
        }

        if let Some(secs) = env_u64(REGRESSIVOS_HTTP_CONNECT_TIMEOUT_SECS)? {
            self.connect_timeout_secs = secs;
        }

        if let Some(secs) = env_u64(REGRESSIVOS_REFRESH_INTERVAL_SECS)? {
            self.refresh_interval_secs = secs;
        }

        self.refresh_interval_secs = clamp_refresh(self.refresh_interval_secs);
        self.base_url = normalize_base_url(&self.base_url);
        Ok(())
    }

    /// Overrides the base URL (the `--api-url` flag).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(&url.into());
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("request_timeout_secs"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("connect_timeout_secs"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(clamp_refresh(self.refresh_interval_secs))
    }
}

fn env_u64(var: &str) -> ConfigResult<Option<u64>> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber {
                var: var.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

fn clamp_refresh(secs: u64) -> u64 {
    secs.clamp(MIN_REFRESH_INTERVAL_SECS, MAX_REFRESH_INTERVAL_SECS)
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
