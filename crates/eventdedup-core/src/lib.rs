//! Core types, configuration and logging for the eventdedup dashboard

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{Config, DashboardConfig, LoggingConfig, WebServerConfig};
pub use error::{Error, Result};
pub use types::{
    EventDetail, EventListPayload, EventRecord, PageQuery, PostgresStats, RedisStats,
    StatsPayload,
};

/// Initialize the logging system
///
/// `RUST_LOG` wins over the configured level. `format = "text"` selects the
/// human-readable formatter, anything else emits JSON lines.
///
/// # Errors
///
/// Returns an error if the configured level is not a valid filter directive or a
/// global subscriber is already installed.
pub fn init_logging(logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level).map_err(|e| Error::Configuration {
            message: format!("invalid log level '{}': {e}", logging.level),
        })?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if logging.format.eq_ignore_ascii_case("text") {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    };

    installed.map_err(|e| Error::Other(format!("Failed to install log subscriber: {e}")))
}
