//! Configuration management for the eventdedup dashboard

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Dashboard polling configuration
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Web server configuration
    #[serde(default)]
    pub webserver: WebServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Dashboard polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Base URL of the deduplication service API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Refresh interval in milliseconds
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Events per page when the request does not name one
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Serve the database UI pages
    #[serde(default = "default_enable_ui")]
    pub enable_ui: bool,

    /// Per-request timeout in milliseconds; unset means requests never time out
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or text)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_api_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

const fn default_refresh_interval_ms() -> u64 {
    5000
}

const fn default_limit() -> u32 {
    50
}

const fn default_enable_ui() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            refresh_interval_ms: default_refresh_interval_ms(),
            default_limit: default_limit(),
            enable_ui: default_enable_ui(),
            request_timeout_ms: None,
        }
    }
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl DashboardConfig {
    /// Refresh interval as a [`Duration`]
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Request timeout as a [`Duration`], if one is configured
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

impl Config {
    /// Load configuration from an optional `config` file and `EVENTDEDUP_*` environment
    /// variables, e.g. `EVENTDEDUP_DASHBOARD__API_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, parsed or validated.
    pub fn load() -> crate::Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("EVENTDEDUP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field.
    pub fn validate(&self) -> crate::Result<()> {
        if self.dashboard.refresh_interval_ms == 0 {
            return Err(crate::Error::Validation {
                field: "dashboard.refresh_interval_ms".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if !(1..=1000).contains(&self.dashboard.default_limit) {
            return Err(crate::Error::Validation {
                field: "dashboard.default_limit".to_string(),
                message: "must be between 1 and 1000".to_string(),
            });
        }
        if self.dashboard.api_base_url.trim().is_empty() {
            return Err(crate::Error::Validation {
                field: "dashboard.api_base_url".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
