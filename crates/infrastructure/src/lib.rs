//! Infrastructure layer - Adapters for external systems
//!
//! Implements the application ports on top of the Open-Meteo, ipinfo and
//! chat completion clients, and owns configuration loading and logging.

pub mod adapters;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, Credentials, ENV_PREFIX};
pub use telemetry::{LogFormat, LoggingConfig, TelemetryError, init_logging};
