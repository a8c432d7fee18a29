// ABOUTME: Configuration management for the regressivos console
// ABOUTME: Env var names plus layered console settings (defaults, TOML file, env, flags)

pub mod constants;
mod settings;

pub use settings::{
    regressivos_home, ConfigError, ConfigResult, ConsoleConfig, DEFAULT_BASE_URL,
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REFRESH_INTERVAL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    MAX_REFRESH_INTERVAL_SECS, MIN_REFRESH_INTERVAL_SECS,
};
