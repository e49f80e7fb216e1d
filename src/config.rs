//! Service configuration.
//!
//! Configuration is built once at startup and passed into the shell. Layers,
//! lowest to highest priority:
//!
//! ```text
//! stock defaults  →  config file (--config)  →  environment variables
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! base_url = "https://www.visitscotland.com"  # origin; request paths are appended
//! verbose = false                              # debug-level request logging
//!
//! [origin]
//! auth_header = "VS-Auth"        # static credential header sent to the origin
//! auth_token = "vsAuth"          # its value
//! timeout_secs = 5               # fetch timeout
//! max_source_bytes = 10485760    # source size ceiling (10 MB)
//!
//! [server]
//! listen_addr = "0.0.0.0"
//! port = 3000
//! ```
//!
//! ## Environment Overrides
//!
//! | Variable | Key |
//! |---|---|
//! | `VS_BASE_URL` | `base_url` |
//! | `VS_AUTH` | `origin.auth_token` |
//! | `VS_LOGGING` | `verbose` (only the exact value `true` enables it) |
//! | `PORT` | `server.port` |
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Service configuration.
///
/// All fields have defaults. A config file need only specify the values it
/// wants to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScalerConfig {
    /// Origin base URL. The request path is appended verbatim.
    pub base_url: String,
    /// Emit debug-level request logs.
    pub verbose: bool,
    /// How the origin is reached.
    pub origin: OriginConfig,
    /// Persistent server bind settings.
    pub server: ServerConfig,
}

impl Default for ScalerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.visitscotland.com".to_string(),
            verbose: false,
            origin: OriginConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Origin fetch settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OriginConfig {
    /// Name of the static credential header.
    pub auth_header: String,
    /// Value sent in `auth_header`.
    pub auth_token: String,
    /// Whole-request timeout for the origin fetch.
    pub timeout_secs: u64,
    /// Sources larger than this are rejected with 413.
    pub max_source_bytes: u64,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            auth_header: "VS-Auth".to_string(),
            auth_token: "vsAuth".to_string(),
            timeout_secs: 5,
            max_source_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Persistent server settings. Ignored by the Lambda shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ScalerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "base_url must start with http:// or https://".into(),
            ));
        }
        if self.base_url.ends_with('/') {
            return Err(ConfigError::Validation(
                "base_url must not end with '/' (request paths already start with one)".into(),
            ));
        }
        if self.origin.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "origin.timeout_secs must be positive".into(),
            ));
        }
        if self.origin.max_source_bytes == 0 {
            return Err(ConfigError::Validation(
                "origin.max_source_bytes must be positive".into(),
            ));
        }
        if reqwest::header::HeaderName::from_bytes(self.origin.auth_header.as_bytes()).is_err() {
            return Err(ConfigError::Validation(format!(
                "origin.auth_header '{}' is not a valid header name",
                self.origin.auth_header
            )));
        }
        Ok(())
    }

    /// `host:port` for the persistent server.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.listen_addr, self.server.port)
    }
}

/// User-Agent sent to the origin.
pub fn user_agent() -> String {
    format!("VS-Image-Scaler/{}", env!("CARGO_PKG_VERSION"))
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ScalerConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply environment overrides through `lookup`.
///
/// Takes a lookup function instead of reading the process environment so
/// tests do not race on global state.
pub fn apply_env(
    mut config: ScalerConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ScalerConfig, ConfigError> {
    if let Some(base_url) = lookup("VS_BASE_URL") {
        config.base_url = base_url;
    }
    if let Some(token) = lookup("VS_AUTH") {
        config.origin.auth_token = token;
    }
    if let Some(flag) = lookup("VS_LOGGING") {
        config.verbose = flag == "true";
    }
    if let Some(port) = lookup("PORT") {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::Validation(format!("PORT '{port}' is not a valid port")))?;
    }
    Ok(config)
}

/// Load the effective configuration.
///
/// Merges the optional file on top of stock defaults, rejects unknown keys,
/// applies environment overrides, and validates the result.
pub fn load_config(path: Option<&Path>) -> Result<ScalerConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// [`load_config`] with an explicit environment.
pub fn load_config_with_env(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ScalerConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match path {
        Some(p) => merge_toml(base, load_raw_config(p)?),
        None => base,
    };
    let config: ScalerConfig = merged.try_into()?;
    let config = apply_env(config, lookup)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Image Scaler Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Environment variables override this file:
#   VS_BASE_URL -> base_url
#   VS_AUTH     -> origin.auth_token
#   VS_LOGGING  -> verbose ("true" enables)
#   PORT        -> server.port
#
# Unknown keys will cause an error.

# Origin base URL. The request path is appended verbatim, so no trailing slash.
base_url = "https://www.visitscotland.com"

# Debug-level request logging (crop decisions, conversion stats, timings).
verbose = false

# ---------------------------------------------------------------------------
# Origin fetch
# ---------------------------------------------------------------------------
[origin]
# Static credential header forwarded on every origin request.
auth_header = "VS-Auth"
auth_token = "vsAuth"

# Whole-request timeout in seconds.
timeout_secs = 5

# Sources larger than this many bytes are rejected with 413.
max_source_bytes = 10485760

# ---------------------------------------------------------------------------
# Persistent server (ignored when running as a Lambda function)
# ---------------------------------------------------------------------------
[server]
listen_addr = "0.0.0.0"
port = 3000
"##
}
