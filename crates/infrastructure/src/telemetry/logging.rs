//! Subscriber setup for human-readable or JSON logs

use serde::{Deserialize, Serialize};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Output format
    #[serde(default)]
    pub format: LogFormat,

    /// Filter directives (e.g., "warn", "application=debug,info")
    ///
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: default_filter(),
        }
    }
}

impl LoggingConfig {
    /// Filter level for a count of `-v` flags; zero keeps the configured filter
    #[must_use]
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        let level = match verbose {
            0 => return self,
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        self.filter = level.to_string();
        self
    }
}

/// Error type for logging initialization
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The filter directives could not be parsed
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter {
        /// The rejected directives
        filter: String,
        /// Parser message
        reason: String,
    },

    /// Failed to install the global subscriber
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter).map_err(|e| TelemetryError::InvalidFilter {
        filter: config.filter.clone(),
        reason: e.to_string(),
    })
}

/// Install the global subscriber
///
/// # Errors
///
/// Fails if the filter is invalid or a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
    .map_err(|e| TelemetryError::Init(e.to_string()))?;

    debug!(format = ?config.format, "Logging initialized");
    Ok(())
}
