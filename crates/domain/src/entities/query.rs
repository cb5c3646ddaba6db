//! Structured weather query - the typed form of a user utterance

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::DomainError;

/// Category of weather question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Conditions right now
    Current,
    /// Today or upcoming days
    Forecast,
    /// A day in the past
    Historical,
}

impl Intent {
    /// Lowercase name used in prompts, logs and JSON
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Forecast => "forecast",
            Self::Historical => "historical",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "current" | "now" | "current_weather" => Ok(Self::Current),
            "forecast" | "future" => Ok(Self::Forecast),
            "historical" | "history" | "past" => Ok(Self::Historical),
            other => Err(DomainError::ValidationError(format!(
                "unknown weather intent: {other}"
            ))),
        }
    }
}

/// A weather question broken into intent and raw slots
///
/// Produced fresh for every turn and never mutated afterwards. Slot text is
/// kept raw; resolving it into coordinates and dates happens downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredQuery {
    intent: Intent,
    city: Option<String>,
    temporal_expression: Option<String>,
}

impl StructuredQuery {
    /// Create a query; blank slot text is treated as absent
    #[must_use]
    pub fn new(
        intent: Intent,
        city: Option<String>,
        temporal_expression: Option<String>,
    ) -> Self {
        Self {
            intent,
            city: non_blank(city),
            temporal_expression: non_blank(temporal_expression),
        }
    }

    /// The intent kind
    #[must_use]
    pub const fn intent(&self) -> Intent {
        self.intent
    }

    /// Raw city text, if the user named one
    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// Raw temporal expression, if the user gave one
    #[must_use]
    pub fn temporal_expression(&self) -> Option<&str> {
        self.temporal_expression.as_deref()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
