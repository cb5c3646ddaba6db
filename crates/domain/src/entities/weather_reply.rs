//! Reply produced at the end of every turn

use serde::{Deserialize, Serialize};

/// Outcome of a turn, rendered to the user and then discarded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReply {
    /// Whether weather data was retrieved
    pub success: bool,
    /// Human-readable response
    pub message: String,
    /// Provider payload backing the message, when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<serde_json::Value>,
}

impl WeatherReply {
    /// Successful reply with the data it was formatted from
    #[must_use]
    pub fn success(message: impl Into<String>, raw_data: Option<serde_json::Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            raw_data,
        }
    }

    /// Failed reply explaining what went wrong
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            raw_data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_has_no_data() {
        let reply = WeatherReply::failure("no city");
        assert!(!reply.success);
        assert!(reply.raw_data.is_none());
    }

    #[test]
    fn success_skips_missing_data_in_json() {
        let reply = WeatherReply::success("sunny", None);
        let json = serde_json::to_string(&reply).unwrap();
        assert!(!json.contains("raw_data"));
    }
}
