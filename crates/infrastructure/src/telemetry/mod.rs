//! Log output
//!
//! Installs the global `tracing` subscriber. Logs go to stderr so that
//! replies printed on stdout stay clean.

mod logging;

pub use logging::{LogFormat, LoggingConfig, TelemetryError, init_logging};
