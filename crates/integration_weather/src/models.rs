//! Weather data models
//!
//! Types for representing weather and geocoding data from the Open-Meteo APIs.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Weather condition derived from WMO weather codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    /// Clear sky (WMO 0)
    ClearSky,
    /// Mainly clear (WMO 1)
    MainlyClear,
    /// Partly cloudy (WMO 2)
    PartlyCloudy,
    /// Overcast (WMO 3)
    Overcast,
    /// Fog (WMO 45, 48)
    Fog,
    /// Drizzle (WMO 51, 53, 55)
    Drizzle,
    /// Freezing drizzle (WMO 56, 57)
    FreezingDrizzle,
    /// Slight rain (WMO 61)
    SlightRain,
    /// Moderate rain (WMO 63)
    ModerateRain,
    /// Heavy rain (WMO 65)
    HeavyRain,
    /// Freezing rain (WMO 66, 67)
    FreezingRain,
    /// Snow (WMO 71, 73, 75)
    Snow,
    /// Snow grains (WMO 77)
    SnowGrains,
    /// Rain showers (WMO 80, 81, 82)
    RainShowers,
    /// Snow showers (WMO 85, 86)
    SnowShowers,
    /// Thunderstorm (WMO 95)
    Thunderstorm,
    /// Thunderstorm with hail (WMO 96, 99)
    ThunderstormWithHail,
    /// Unknown condition
    Unknown,
}

impl WeatherCondition {
    /// Convert WMO weather code to `WeatherCondition`
    ///
    /// See: <https://open-meteo.com/en/docs> for WMO code reference
    #[must_use]
    pub const fn from_wmo_code(code: u8) -> Self {
        match code {
            0 => Self::ClearSky,
            1 => Self::MainlyClear,
            2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::FreezingDrizzle,
            61 => Self::SlightRain,
            63 => Self::ModerateRain,
            65 => Self::HeavyRain,
            66 | 67 => Self::FreezingRain,
            71 | 73 | 75 => Self::Snow,
            77 => Self::SnowGrains,
            80..=82 => Self::RainShowers,
            85 | 86 => Self::SnowShowers,
            95 => Self::Thunderstorm,
            96 | 99 => Self::ThunderstormWithHail,
            _ => Self::Unknown,
        }
    }

    /// Condition for an optional code; missing codes are `Unknown`
    #[must_use]
    pub const fn from_optional_code(code: Option<u8>) -> Self {
        match code {
            Some(code) => Self::from_wmo_code(code),
            None => Self::Unknown,
        }
    }

    /// Get a human-readable description of the weather condition
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::ClearSky => "Clear sky",
            Self::MainlyClear => "Mainly clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Overcast => "Overcast",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::FreezingDrizzle => "Freezing drizzle",
            Self::SlightRain => "Slight rain",
            Self::ModerateRain => "Moderate rain",
            Self::HeavyRain => "Heavy rain",
            Self::FreezingRain => "Freezing rain",
            Self::Snow => "Snow",
            Self::SnowGrains => "Snow grains",
            Self::RainShowers => "Rain showers",
            Self::SnowShowers => "Snow showers",
            Self::Thunderstorm => "Thunderstorm",
            Self::ThunderstormWithHail => "Thunderstorm with hail",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Current weather conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Observation time, local to the location
    pub time: NaiveDateTime,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Apparent (feels like) temperature in Celsius
    pub apparent_temperature: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Weather condition
    pub condition: WeatherCondition,
    /// WMO weather code
    pub weather_code: u8,
    /// Wind speed in km/h
    pub wind_speed: f64,
    /// Wind direction in degrees (0-360)
    pub wind_direction: Option<u16>,
    /// Surface pressure in hPa
    pub pressure: f64,
}

/// Daily weather forecast
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Forecast date
    pub date: NaiveDate,
    /// Dominant weather condition
    pub condition: WeatherCondition,
    /// Maximum temperature in Celsius
    pub temperature_max: f64,
    /// Minimum temperature in Celsius
    pub temperature_min: f64,
    /// Total precipitation in mm
    pub precipitation_sum: f64,
    /// Precipitation probability percentage (0-100)
    pub precipitation_probability: Option<u8>,
    /// Maximum wind speed in km/h
    pub wind_speed_max: Option<f64>,
}

/// Observed weather for a past day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyObservation {
    /// Observed date
    pub date: NaiveDate,
    /// Dominant weather condition
    pub condition: WeatherCondition,
    /// Maximum temperature in Celsius
    pub temperature_max: f64,
    /// Minimum temperature in Celsius
    pub temperature_min: f64,
    /// Mean temperature in Celsius
    pub temperature_mean: Option<f64>,
    /// Total precipitation in mm
    pub precipitation_sum: f64,
    /// Maximum wind speed in km/h
    pub wind_speed_max: Option<f64>,
}

/// A place found by the geocoding API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    /// Place name
    pub name: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Country name
    pub country: Option<String>,
    /// ISO country code
    pub country_code: Option<String>,
    /// First-level administrative area
    pub admin1: Option<String>,
    /// Population, when known
    pub population: Option<u64>,
}

/// Raw weather data from API (current)
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherData {
    pub time: String,
    pub temperature_2m: f64,
    pub relative_humidity_2m: u8,
    pub apparent_temperature: f64,
    pub weather_code: u8,
    pub wind_speed_10m: f64,
    #[serde(default)]
    pub wind_direction_10m: Option<u16>,
    pub surface_pressure: f64,
}

/// Raw daily data from API
///
/// Archive responses use `null` for days without observations, so every
/// value column is optional per entry.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyData {
    pub time: Vec<String>,
    #[serde(default)]
    pub weather_code: Vec<Option<u8>>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability_max: Vec<Option<u8>>,
    #[serde(default)]
    pub wind_speed_10m_max: Vec<Option<f64>>,
}

impl DailyData {
    /// Value at `index` of an optional column
    pub(crate) fn at<T: Copy>(column: &[Option<T>], index: usize) -> Option<T> {
        column.get(index).copied().flatten()
    }
}

/// Raw API response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timezone: Option<String>,
    pub current: Option<WeatherData>,
    pub daily: Option<DailyData>,
}

/// Raw geocoding response; `results` is absent when nothing matched
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingResponse {
    #[serde(default)]
    pub results: Vec<Place>,
}

/// Error body returned with HTTP 400
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub reason: String,
}
