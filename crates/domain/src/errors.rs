//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Coordinates outside the valid latitude/longitude ranges
    #[error("Invalid coordinates: {latitude}, {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// A date range whose end lies before its start
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Create an invalid date range error
    pub fn invalid_range(start: impl ToString, end: impl ToString) -> Self {
        Self::InvalidDateRange {
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}
