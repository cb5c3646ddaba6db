//! ipinfo.io client

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// IP geolocation errors
#[derive(Debug, Error)]
pub enum GeoIpError {
    /// Connection to the lookup service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the lookup service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse response
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The service answered but could not place the address
    #[error("Location unknown: {0}")]
    LocationUnknown(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Service is temporarily unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// IP lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoIpConfig {
    /// Base URL (default: <https://ipinfo.io>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://ipinfo.io".to_string()
}

const fn default_timeout() -> u64 {
    10
}

impl Default for GeoIpConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Location of the caller's public IP address
#[derive(Debug, Clone, PartialEq)]
pub struct IpInfo {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// City name, when reported
    pub city: Option<String>,
    /// Region, when reported
    pub region: Option<String>,
    /// ISO country code, when reported
    pub country: Option<String>,
}

/// Raw `/json` response
#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    loc: Option<String>,
    #[serde(default)]
    bogon: bool,
}

/// Looks up the caller's approximate location
#[async_trait]
pub trait GeoIpClient: Send + Sync {
    /// Locate the public IP address the request comes from
    async fn lookup(&self) -> Result<IpInfo, GeoIpError>;
}

/// ipinfo.io HTTP client
#[derive(Debug)]
pub struct IpInfoClient {
    client: Client,
    config: GeoIpConfig,
}

impl IpInfoClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: GeoIpConfig) -> Result<Self, GeoIpError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GeoIpError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Parse the "lat,lon" pair ipinfo reports
    fn parse_loc(loc: &str) -> Result<(f64, f64), GeoIpError> {
        let (lat, lon) = loc
            .split_once(',')
            .ok_or_else(|| GeoIpError::ParseError(format!("Invalid loc: {loc}")))?;

        let latitude = lat
            .trim()
            .parse::<f64>()
            .map_err(|e| GeoIpError::ParseError(format!("Invalid latitude {lat}: {e}")))?;
        let longitude = lon
            .trim()
            .parse::<f64>()
            .map_err(|e| GeoIpError::ParseError(format!("Invalid longitude {lon}: {e}")))?;

        Ok((latitude, longitude))
    }

    fn into_ip_info(response: IpInfoResponse) -> Result<IpInfo, GeoIpError> {
        if response.bogon {
            return Err(GeoIpError::LocationUnknown(
                "address is private or reserved".to_string(),
            ));
        }

        let loc = response
            .loc
            .filter(|l| !l.trim().is_empty())
            .ok_or_else(|| GeoIpError::LocationUnknown("no coordinates reported".to_string()))?;
        let (latitude, longitude) = Self::parse_loc(&loc)?;

        let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());

        Ok(IpInfo {
            latitude,
            longitude,
            city: non_empty(response.city),
            region: non_empty(response.region),
            country: non_empty(response.country),
        })
    }
}

#[async_trait]
impl GeoIpClient for IpInfoClient {
    #[instrument(skip(self))]
    async fn lookup(&self) -> Result<IpInfo, GeoIpError> {
        let url = format!("{}/json", self.config.base_url);
        debug!(url = %url, "Looking up IP location");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                GeoIpError::RequestFailed(format!("timed out: {e}"))
            } else {
                GeoIpError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GeoIpError::RateLimitExceeded);
        }
        if status.is_server_error() {
            return Err(GeoIpError::ServiceUnavailable(format!("HTTP {status}")));
        }
        if !status.is_success() {
            warn!(status = %status, "IP lookup rejected");
            return Err(GeoIpError::RequestFailed(format!("HTTP {status}")));
        }

        let body: IpInfoResponse = response
            .json()
            .await
            .map_err(|e| GeoIpError::ParseError(e.to_string()))?;

        let info = Self::into_ip_info(body)?;
        debug!(city = ?info.city, lat = info.latitude, lon = info.longitude, "IP located");
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: serde_json::Value) -> IpInfoResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn config_defaults() {
        let config = GeoIpConfig::default();
        assert_eq!(config.base_url, "https://ipinfo.io");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn parse_loc_valid() {
        let (lat, lon) = IpInfoClient::parse_loc("37.3860,-122.0838").unwrap();
        assert!((lat - 37.386).abs() < 1e-9);
        assert!((lon + 122.0838).abs() < 1e-9);
    }

    #[test]
    fn parse_loc_invalid() {
        assert!(IpInfoClient::parse_loc("37.3860").is_err());
        assert!(IpInfoClient::parse_loc("north,west").is_err());
    }

    #[test]
    fn full_response_maps_all_fields() {
        let info = IpInfoClient::into_ip_info(response(serde_json::json!({
            "ip": "8.8.8.8",
            "city": "Mountain View",
            "region": "California",
            "country": "US",
            "loc": "37.4056,-122.0775",
            "timezone": "America/Los_Angeles"
        })))
        .unwrap();
        assert_eq!(info.city.as_deref(), Some("Mountain View"));
        assert_eq!(info.region.as_deref(), Some("California"));
        assert_eq!(info.country.as_deref(), Some("US"));
    }

    #[test]
    fn empty_city_becomes_none() {
        let info = IpInfoClient::into_ip_info(response(serde_json::json!({
            "city": "",
            "loc": "10.0,20.0"
        })))
        .unwrap();
        assert!(info.city.is_none());
    }

    #[test]
    fn bogon_is_unknown() {
        let err = IpInfoClient::into_ip_info(response(serde_json::json!({
            "ip": "10.0.0.1",
            "bogon": true
        })))
        .unwrap_err();
        assert!(matches!(err, GeoIpError::LocationUnknown(_)));
    }

    #[test]
    fn missing_loc_is_unknown() {
        let err = IpInfoClient::into_ip_info(response(serde_json::json!({"city": "Paris"})))
            .unwrap_err();
        assert!(matches!(err, GeoIpError::LocationUnknown(_)));
    }
}
