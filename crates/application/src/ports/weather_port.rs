//! Weather service port
//!
//! Defines the interface for weather data retrieval and place-name lookup.
//! All values are metric: Celsius, km/h, hPa, mm.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use domain::value_objects::{GeoLocation, ResolvedDate};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Current weather conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Temperature in Celsius
    pub temperature: f64,
    /// Apparent/feels-like temperature in Celsius
    pub apparent_temperature: f64,
    /// Relative humidity in percent (0-100)
    pub humidity: u8,
    /// Surface pressure in hPa
    pub pressure: f64,
    /// Wind speed in km/h
    pub wind_speed: f64,
    /// Wind direction in degrees, when reported
    pub wind_direction: Option<u16>,
    /// Weather condition description
    pub condition: WeatherCondition,
    /// Local time at the location when this data was observed
    pub observed_at: NaiveDateTime,
}

/// Weather summary for one forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// The date of the forecast
    pub date: NaiveDate,
    /// Maximum temperature in Celsius
    pub temperature_max: f64,
    /// Minimum temperature in Celsius
    pub temperature_min: f64,
    /// Weather condition
    pub condition: WeatherCondition,
    /// Precipitation probability (0-100)
    pub precipitation_probability: Option<u8>,
    /// Expected precipitation in mm
    pub precipitation_sum: f64,
    /// Maximum wind speed in km/h
    pub wind_speed_max: Option<f64>,
}

/// Observed weather for one past day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalObservation {
    /// The observed day
    pub date: NaiveDate,
    /// Maximum temperature in Celsius
    pub temperature_max: f64,
    /// Minimum temperature in Celsius
    pub temperature_min: f64,
    /// Mean temperature in Celsius, when reported
    pub temperature_mean: Option<f64>,
    /// Total precipitation in mm
    pub precipitation_sum: f64,
    /// Maximum wind speed in km/h
    pub wind_speed_max: Option<f64>,
    /// Dominant weather condition
    pub condition: WeatherCondition,
}

/// A place returned by the geocoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    /// Place name as known to the provider
    pub name: String,
    /// Coordinates of the place
    pub coordinates: GeoLocation,
    /// Population, when known
    pub population: Option<u64>,
    /// Country name
    pub country: Option<String>,
    /// First-level administrative area (state, province)
    pub admin1: Option<String>,
}

/// Weather conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    /// Clear sky
    ClearSky,
    /// Mainly clear
    MainlyClear,
    /// Partly cloudy
    PartlyCloudy,
    /// Overcast
    Overcast,
    /// Foggy
    Fog,
    /// Drizzle
    Drizzle,
    /// Light rain
    LightRain,
    /// Moderate rain
    ModerateRain,
    /// Heavy rain
    HeavyRain,
    /// Snow
    Snow,
    /// Thunderstorm
    Thunderstorm,
    /// Unknown condition
    Unknown,
}

impl WeatherCondition {
    /// Get a human-readable description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::ClearSky => "Clear sky",
            Self::MainlyClear => "Mainly clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Overcast => "Overcast",
            Self::Fog => "Foggy",
            Self::Drizzle => "Light drizzle",
            Self::LightRain => "Light rain",
            Self::ModerateRain => "Moderate rain",
            Self::HeavyRain => "Heavy rain",
            Self::Snow => "Snow",
            Self::Thunderstorm => "Thunderstorm",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether precipitation of any kind is falling
    #[must_use]
    pub const fn is_wet(&self) -> bool {
        matches!(
            self,
            Self::Drizzle
                | Self::LightRain
                | Self::ModerateRain
                | Self::HeavyRain
                | Self::Snow
                | Self::Thunderstorm
        )
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Port for weather service operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WeatherPort: Send + Sync {
    /// Conditions right now at a location
    async fn current(&self, location: &GeoLocation) -> Result<CurrentConditions, ProviderError>;

    /// Daily summaries for every day in `dates`, ordered by date
    async fn forecast(
        &self,
        location: &GeoLocation,
        dates: &ResolvedDate,
    ) -> Result<Vec<DailySummary>, ProviderError>;

    /// Observed weather for one past day, relative to the turn's `today`
    ///
    /// Returns `ProviderError::NotAvailable` when the day is outside the
    /// provider's coverage or no values were recorded.
    async fn historical(
        &self,
        location: &GeoLocation,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<HistoricalObservation, ProviderError>;

    /// Places matching a name, in provider order
    async fn geocode(&self, name: &str) -> Result<Vec<GeocodeCandidate>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn WeatherPort) {}

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn WeatherPort>();
    }

    #[test]
    fn weather_condition_display() {
        assert_eq!(WeatherCondition::ClearSky.to_string(), "Clear sky");
        assert_eq!(WeatherCondition::Thunderstorm.description(), "Thunderstorm");
    }

    #[test]
    fn wet_conditions() {
        assert!(WeatherCondition::Drizzle.is_wet());
        assert!(WeatherCondition::Snow.is_wet());
        assert!(!WeatherCondition::Overcast.is_wet());
        assert!(!WeatherCondition::Fog.is_wet());
    }

    #[test]
    fn condition_serializes_snake_case() {
        let json = serde_json::to_value(WeatherCondition::PartlyCloudy).unwrap();
        assert_eq!(json, "partly_cloudy");
    }
}
