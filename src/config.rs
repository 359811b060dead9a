//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Warranty service API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token for the statistics and preferences endpoints
    pub token: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8005".to_string()
}

fn default_request_timeout() -> u64 {
    10_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            request_timeout_ms: default_request_timeout(),
        }
    }
}

/// Dashboard behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Fallback expiring-soon threshold when preferences are unavailable
    #[serde(default = "default_expiring_soon_days")]
    pub expiring_soon_days: i64,
}

fn default_expiring_soon_days() -> i64 {
    30
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            expiring_soon_days: default_expiring_soon_days(),
        }
    }
}

/// CSV export configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// strftime format for dates in the table and CSV export
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_date_format() -> String {
    "%m/%d/%Y".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment.
    ///
    /// Does not log: the logging subscriber is configured from the
    /// result, so the source is reported back to the caller instead.
    pub fn load_default() -> (Self, ConfigSource) {
        let candidates: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("warden").join("config.toml")),
            Some(PathBuf::from("/etc/warden/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_from_candidates(&candidates)
    }

    fn load_from_candidates(candidates: &[PathBuf]) -> (Self, ConfigSource) {
        let mut source = ConfigSource::default();

        for path in candidates {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        source.path = Some(path.clone());
                        return (config, source);
                    }
                    Err(e) => source.errors.push(e.to_string()),
                }
            }
        }

        let mut config = Config::default();
        config.apply_env_overrides();
        (config, source)
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("WARDEN_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(token) = std::env::var("WARDEN_API_TOKEN") {
            self.api.token = Some(token);
        }
        if let Ok(days) = std::env::var("WARDEN_EXPIRING_SOON_DAYS") {
            if let Ok(d) = days.parse() {
                self.dashboard.expiring_soon_days = d;
            }
        }
        if let Ok(level) = std::env::var("WARDEN_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("WARDEN_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Where the active config came from, plus any candidate files that
/// existed but failed to load. Emitted as log events once the
/// subscriber is installed.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    /// File the config was loaded from, if any
    pub path: Option<PathBuf>,
    /// Load errors from candidates that were skipped
    pub errors: Vec<String>,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Warden Configuration
#
# Environment variables override these settings:
# - WARDEN_API_URL
# - WARDEN_API_TOKEN
# - WARDEN_EXPIRING_SOON_DAYS
# - WARDEN_LOG_LEVEL
# - WARDEN_LOG_FORMAT

[api]
# Base URL of the warranty service
base_url = "http://localhost:8005"

# Bearer token for authenticated endpoints
# token = ""

# Request timeout in milliseconds
request_timeout_ms = 10000

[dashboard]
# Fallback expiring-soon threshold (days) when the preferences
# endpoint is unavailable; the server-side preference wins otherwise
expiring_soon_days = 30

[export]
# strftime format for dates in the table and CSV export
date_format = "%m/%d/%Y"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
