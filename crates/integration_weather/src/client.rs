//! Open-Meteo weather client
//!
//! HTTP client for the Open-Meteo customer APIs: forecast, historical
//! archive and geocoding. Every request carries the account's `apikey`.

use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveDateTime};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::models::{
    ApiErrorBody, ApiResponse, CurrentWeather, DailyData, DailyForecast, DailyObservation,
    GeocodingResponse, Place, WeatherCondition, WeatherData,
};

/// Variables requested for current conditions
const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
                              weather_code,wind_speed_10m,wind_direction_10m,surface_pressure";

/// Variables requested for forecast days
const FORECAST_DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,\
                                     precipitation_sum,precipitation_probability_max,\
                                     wind_speed_10m_max";

/// Variables requested for observed days
const HISTORICAL_DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,\
                                       temperature_2m_mean,precipitation_sum,wind_speed_10m_max";

/// Weather client errors
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Connection to the weather service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the weather service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse response from weather service
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid coordinates provided
    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,

    /// Service is temporarily unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// The service has no data for the requested date or place
    #[error("Data not available: {0}")]
    NotAvailable(String),
}

/// Weather service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Forecast API base URL (default: <https://customer-api.open-meteo.com/v1>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Historical archive API base URL
    #[serde(default = "default_archive_url")]
    pub archive_url: String,

    /// Geocoding API base URL
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,

    /// Connection timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Past days still served by the forecast API (default: 92)
    #[serde(default = "default_recent_days")]
    pub recent_history_days: u32,

    /// Maximum geocoding candidates to request (default: 10)
    #[serde(default = "default_geocoding_count")]
    pub geocoding_count: u8,
}

fn default_base_url() -> String {
    "https://customer-api.open-meteo.com/v1".to_string()
}

fn default_archive_url() -> String {
    "https://customer-archive-api.open-meteo.com/v1".to_string()
}

fn default_geocoding_url() -> String {
    "https://customer-geocoding-api.open-meteo.com/v1".to_string()
}

const fn default_timeout() -> u64 {
    30
}

const fn default_recent_days() -> u32 {
    92
}

const fn default_geocoding_count() -> u8 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            archive_url: default_archive_url(),
            geocoding_url: default_geocoding_url(),
            timeout_secs: default_timeout(),
            recent_history_days: default_recent_days(),
            geocoding_count: default_geocoding_count(),
        }
    }
}

/// Whether a rejection reason says the requested days are not covered
fn is_out_of_range(reason: &str) -> bool {
    reason.to_lowercase().contains("out of allowed range")
}

/// First day covered by the historical archive
#[must_use]
pub fn archive_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(1940, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Weather client trait for fetching weather data
#[async_trait]
pub trait WeatherClient: Send + Sync {
    /// Get current weather for a location
    async fn get_current(&self, latitude: f64, longitude: f64)
    -> Result<CurrentWeather, WeatherError>;

    /// Get daily forecasts for `start..=end`
    async fn get_daily_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyForecast>, WeatherError>;

    /// Get observed weather for one past day
    ///
    /// `today` is the caller's reference day. Days close to it are served by
    /// the forecast endpoint because the archive lags behind.
    async fn get_historical(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<DailyObservation, WeatherError>;

    /// Search places by name
    async fn search_places(&self, name: &str) -> Result<Vec<Place>, WeatherError>;
}

/// Open-Meteo HTTP client implementation
pub struct OpenMeteoClient {
    client: Client,
    config: WeatherConfig,
    api_key: String,
}

impl std::fmt::Debug for OpenMeteoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenMeteoClient")
            .field("config", &self.config)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl OpenMeteoClient {
    /// Create a new Open-Meteo client with the given configuration
    ///
    /// An empty `api_key` omits the `apikey` parameter, which the free
    /// public endpoints accept.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: WeatherConfig, api_key: impl Into<String>) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WeatherError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }

    /// Validate coordinates
    fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), WeatherError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::InvalidCoordinates);
        }
        Ok(())
    }

    /// Whether a past day is still served by the forecast API
    fn is_recent(&self, date: NaiveDate, today: NaiveDate) -> bool {
        today
            .checked_sub_days(Days::new(u64::from(self.config.recent_history_days)))
            .is_some_and(|cutoff| date >= cutoff)
    }

    /// Send a GET request and decode the JSON body, mapping HTTP failures
    async fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let mut request = self.client.get(url).query(params);
        if !self.api_key.is_empty() {
            request = request.query(&[("apikey", self.api_key.as_str())]);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                WeatherError::RequestFailed(format!("timed out: {e}"))
            } else {
                WeatherError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(WeatherError::RateLimitExceeded);
        }
        if status.is_server_error() {
            return Err(WeatherError::ServiceUnavailable(format!("HTTP {status}")));
        }
        if status == StatusCode::BAD_REQUEST {
            let reason = response
                .json::<ApiErrorBody>()
                .await
                .map(|body| body.reason)
                .unwrap_or_default();
            warn!(reason = %reason, "Weather service rejected request");
            return Err(if is_out_of_range(&reason) {
                WeatherError::NotAvailable(reason)
            } else {
                WeatherError::RequestFailed(reason)
            });
        }
        if !status.is_success() {
            return Err(WeatherError::RequestFailed(format!("HTTP {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| WeatherError::ParseError(e.to_string()))
    }

    /// Parse current weather from API response
    fn parse_current_weather(data: &WeatherData) -> Result<CurrentWeather, WeatherError> {
        let time = Self::parse_datetime(&data.time)?;

        Ok(CurrentWeather {
            time,
            temperature: data.temperature_2m,
            apparent_temperature: data.apparent_temperature,
            humidity: data.relative_humidity_2m,
            condition: WeatherCondition::from_wmo_code(data.weather_code),
            weather_code: data.weather_code,
            wind_speed: data.wind_speed_10m,
            wind_direction: data.wind_direction_10m,
            pressure: data.surface_pressure,
        })
    }

    fn parse_date(s: &str) -> Result<NaiveDate, WeatherError> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| WeatherError::ParseError(format!("Invalid date {s}: {e}")))
    }

    /// Parse daily forecasts from API response
    ///
    /// Days without both temperature extremes are skipped.
    fn parse_daily_forecasts(daily: &DailyData) -> Result<Vec<DailyForecast>, WeatherError> {
        let mut forecasts = Vec::with_capacity(daily.time.len());

        for (i, day) in daily.time.iter().enumerate() {
            let date = Self::parse_date(day)?;
            let (Some(temperature_max), Some(temperature_min)) = (
                DailyData::at(&daily.temperature_2m_max, i),
                DailyData::at(&daily.temperature_2m_min, i),
            ) else {
                debug!(date = %date, "Skipping forecast day without temperatures");
                continue;
            };

            forecasts.push(DailyForecast {
                date,
                condition: WeatherCondition::from_optional_code(DailyData::at(
                    &daily.weather_code,
                    i,
                )),
                temperature_max,
                temperature_min,
                precipitation_sum: DailyData::at(&daily.precipitation_sum, i).unwrap_or(0.0),
                precipitation_probability: DailyData::at(&daily.precipitation_probability_max, i),
                wind_speed_max: DailyData::at(&daily.wind_speed_10m_max, i),
            });
        }

        Ok(forecasts)
    }

    /// Parse the single observed day from API response
    fn parse_observation(
        daily: &DailyData,
        date: NaiveDate,
    ) -> Result<DailyObservation, WeatherError> {
        let index = daily
            .time
            .iter()
            .position(|day| Self::parse_date(day).is_ok_and(|d| d == date))
            .ok_or_else(|| WeatherError::NotAvailable(format!("no data for {date}")))?;

        let (Some(temperature_max), Some(temperature_min)) = (
            DailyData::at(&daily.temperature_2m_max, index),
            DailyData::at(&daily.temperature_2m_min, index),
        ) else {
            return Err(WeatherError::NotAvailable(format!(
                "no observations recorded for {date}"
            )));
        };

        Ok(DailyObservation {
            date,
            condition: WeatherCondition::from_optional_code(DailyData::at(
                &daily.weather_code,
                index,
            )),
            temperature_max,
            temperature_min,
            temperature_mean: DailyData::at(&daily.temperature_2m_mean, index),
            precipitation_sum: DailyData::at(&daily.precipitation_sum, index).unwrap_or(0.0),
            wind_speed_max: DailyData::at(&daily.wind_speed_10m_max, index),
        })
    }

    /// Parse datetime string as local time at the location
    fn parse_datetime(s: &str) -> Result<NaiveDateTime, WeatherError> {
        // Try ISO 8601 format first (2026-02-05T14:00)
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
            return Ok(dt);
        }

        // Try with seconds
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
            return Ok(dt);
        }

        Err(WeatherError::ParseError(format!(
            "Invalid datetime format: {s}"
        )))
    }

    fn daily_params(
        latitude: f64,
        longitude: f64,
        fields: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("daily", fields.to_string()),
            ("start_date", start.to_string()),
            ("end_date", end.to_string()),
            ("timezone", "auto".to_string()),
        ]
    }
}

#[async_trait]
impl WeatherClient for OpenMeteoClient {
    #[instrument(skip(self), fields(lat = %latitude, lon = %longitude))]
    async fn get_current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentWeather, WeatherError> {
        Self::validate_coordinates(latitude, longitude)?;

        let url = format!("{}/forecast", self.config.base_url);
        debug!(url = %url, "Fetching current weather");

        let params = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
        ];
        let api_response: ApiResponse = self.fetch(&url, &params).await?;

        let current_data = api_response.current.ok_or_else(|| {
            WeatherError::ParseError("No current weather data in response".to_string())
        })?;

        Self::parse_current_weather(&current_data)
    }

    #[instrument(skip(self), fields(lat = %latitude, lon = %longitude, start = %start, end = %end))]
    async fn get_daily_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyForecast>, WeatherError> {
        Self::validate_coordinates(latitude, longitude)?;

        let url = format!("{}/forecast", self.config.base_url);
        debug!(url = %url, "Fetching weather forecast");

        let params = Self::daily_params(latitude, longitude, FORECAST_DAILY_FIELDS, start, end);
        let api_response: ApiResponse = self.fetch(&url, &params).await?;

        let daily_data = api_response.daily.ok_or_else(|| {
            WeatherError::ParseError("No daily forecast data in response".to_string())
        })?;

        Self::parse_daily_forecasts(&daily_data)
    }

    #[instrument(skip(self), fields(lat = %latitude, lon = %longitude, date = %date))]
    async fn get_historical(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<DailyObservation, WeatherError> {
        Self::validate_coordinates(latitude, longitude)?;

        if date < archive_start() {
            return Err(WeatherError::NotAvailable(format!(
                "records start on {}",
                archive_start()
            )));
        }

        let url = if self.is_recent(date, today) {
            format!("{}/forecast", self.config.base_url)
        } else {
            format!("{}/archive", self.config.archive_url)
        };
        debug!(url = %url, "Fetching historical weather");

        let params = Self::daily_params(latitude, longitude, HISTORICAL_DAILY_FIELDS, date, date);
        let api_response: ApiResponse = self.fetch(&url, &params).await?;

        let daily_data = api_response
            .daily
            .ok_or_else(|| WeatherError::NotAvailable(format!("no daily data for {date}")))?;

        Self::parse_observation(&daily_data, date)
    }

    #[instrument(skip(self))]
    async fn search_places(&self, name: &str) -> Result<Vec<Place>, WeatherError> {
        let url = format!("{}/search", self.config.geocoding_url);
        debug!(url = %url, "Searching places");

        let params = [
            ("name", name.to_string()),
            ("count", self.config.geocoding_count.to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];
        let response: GeocodingResponse = self.fetch(&url, &params).await?;

        debug!(count = response.results.len(), "Places found");
        Ok(response.results)
    }}
