// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names read by the console

// Backend
pub const REGRESSIVOS_API_URL: &str = "REGRESSIVOS_API_URL";

// HTTP client timeouts
pub const REGRESSIVOS_HTTP_REQUEST_TIMEOUT_SECS: &str = "REGRESSIVOS_HTTP_REQUEST_TIMEOUT_SECS";
pub const REGRESSIVOS_HTTP_CONNECT_TIMEOUT_SECS: &str = "REGRESSIVOS_HTTP_CONNECT_TIMEOUT_SECS";

// Live view
pub const REGRESSIVOS_REFRESH_INTERVAL_SECS: &str = "REGRESSIVOS_REFRESH_INTERVAL_SECS";

// Local state (session file, config file)
pub const REGRESSIVOS_HOME: &str = "REGRESSIVOS_HOME";

// Logging
pub const RUST_LOG: &str = "RUST_LOG";
