//! Weather adapter - Implements WeatherPort using integration_weather

use application::error::{ApplicationError, ProviderError};
use application::ports::{
    CurrentConditions, DailySummary, GeocodeCandidate, HistoricalObservation, WeatherCondition,
    WeatherPort,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use domain::value_objects::{GeoLocation, ResolvedDate};
use integration_weather::{
    CurrentWeather as IntegrationCurrent, DailyForecast as IntegrationDaily, DailyObservation,
    OpenMeteoClient, Place, WeatherClient, WeatherCondition as IntegrationCondition, WeatherConfig,
    WeatherError,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

/// Adapter for weather services using the Open-Meteo API
pub struct WeatherAdapter {
    client: OpenMeteoClient,
}

impl std::fmt::Debug for WeatherAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherAdapter")
            .field("client", &"OpenMeteoClient")
            .finish()
    }
}

impl WeatherAdapter {
    /// Create an adapter for the configured endpoints
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new(config: WeatherConfig, api_key: &SecretString) -> Result<Self, ApplicationError> {
        let client = OpenMeteoClient::new(config, api_key.expose_secret())
            .map_err(|e| ApplicationError::Internal(e.to_string()))?;
        Ok(Self { client })
    }

    /// Map integration weather error to provider error
    fn map_error(err: WeatherError) -> ProviderError {
        match err {
            WeatherError::ConnectionFailed(e)
            | WeatherError::RequestFailed(e)
            | WeatherError::ParseError(e)
            | WeatherError::ServiceUnavailable(e) => ProviderError::NetworkFailure(e),
            WeatherError::InvalidCoordinates => {
                ProviderError::UnknownLocation("coordinates out of range".into())
            },
            WeatherError::RateLimitExceeded => ProviderError::RateLimited,
            WeatherError::NotAvailable(reason) => ProviderError::NotAvailable(reason),
        }
    }

    /// Convert integration weather condition to application weather condition
    const fn map_condition(condition: IntegrationCondition) -> WeatherCondition {
        match condition {
            IntegrationCondition::ClearSky => WeatherCondition::ClearSky,
            IntegrationCondition::MainlyClear => WeatherCondition::MainlyClear,
            IntegrationCondition::PartlyCloudy => WeatherCondition::PartlyCloudy,
            IntegrationCondition::Overcast => WeatherCondition::Overcast,
            IntegrationCondition::Fog => WeatherCondition::Fog,
            IntegrationCondition::Drizzle | IntegrationCondition::FreezingDrizzle => {
                WeatherCondition::Drizzle
            },
            IntegrationCondition::SlightRain => WeatherCondition::LightRain,
            IntegrationCondition::ModerateRain | IntegrationCondition::RainShowers => {
                WeatherCondition::ModerateRain
            },
            IntegrationCondition::HeavyRain | IntegrationCondition::FreezingRain => {
                WeatherCondition::HeavyRain
            },
            IntegrationCondition::Snow
            | IntegrationCondition::SnowGrains
            | IntegrationCondition::SnowShowers => WeatherCondition::Snow,
            IntegrationCondition::Thunderstorm | IntegrationCondition::ThunderstormWithHail => {
                WeatherCondition::Thunderstorm
            },
            IntegrationCondition::Unknown => WeatherCondition::Unknown,
        }
    }

    fn map_current(current: &IntegrationCurrent) -> CurrentConditions {
        CurrentConditions {
            temperature: current.temperature,
            apparent_temperature: current.apparent_temperature,
            humidity: current.humidity,
            pressure: current.pressure,
            wind_speed: current.wind_speed,
            wind_direction: current.wind_direction,
            condition: Self::map_condition(current.condition),
            observed_at: current.time,
        }
    }

    fn map_daily(daily: &IntegrationDaily) -> DailySummary {
        DailySummary {
            date: daily.date,
            temperature_max: daily.temperature_max,
            temperature_min: daily.temperature_min,
            condition: Self::map_condition(daily.condition),
            precipitation_probability: daily.precipitation_probability,
            precipitation_sum: daily.precipitation_sum,
            wind_speed_max: daily.wind_speed_max,
        }
    }

    fn map_observation(observed: &DailyObservation) -> HistoricalObservation {
        HistoricalObservation {
            date: observed.date,
            temperature_max: observed.temperature_max,
            temperature_min: observed.temperature_min,
            temperature_mean: observed.temperature_mean,
            precipitation_sum: observed.precipitation_sum,
            wind_speed_max: observed.wind_speed_max,
            condition: Self::map_condition(observed.condition),
        }
    }

    /// Places with coordinates outside the valid range are dropped
    fn map_place(place: Place) -> Option<GeocodeCandidate> {
        match GeoLocation::new(place.latitude, place.longitude) {
            Ok(coordinates) => Some(GeocodeCandidate {
                name: place.name,
                coordinates,
                population: place.population,
                country: place.country,
                admin1: place.admin1,
            }),
            Err(e) => {
                debug!(place = %place.name, error = %e, "Skipping place with invalid coordinates");
                None
            },
        }
    }
}

#[async_trait]
impl WeatherPort for WeatherAdapter {
    #[instrument(skip(self), fields(lat = location.latitude(), lon = location.longitude()))]
    async fn current(&self, location: &GeoLocation) -> Result<CurrentConditions, ProviderError> {
        let result = self
            .client
            .get_current(location.latitude(), location.longitude())
            .await
            .map_err(Self::map_error);

        match &result {
            Ok(current) => {
                debug!(
                    temperature = current.temperature,
                    condition = %current.condition,
                    "Retrieved current weather"
                );
            },
            Err(e) => {
                debug!(error = %e, "Failed to get current weather");
            },
        }

        result.map(|c| Self::map_current(&c))
    }

    #[instrument(skip(self), fields(lat = location.latitude(), lon = location.longitude(), start = %dates.first(), end = %dates.last()))]
    async fn forecast(
        &self,
        location: &GeoLocation,
        dates: &ResolvedDate,
    ) -> Result<Vec<DailySummary>, ProviderError> {
        let days = self
            .client
            .get_daily_forecast(
                location.latitude(),
                location.longitude(),
                dates.first(),
                dates.last(),
            )
            .await
            .map_err(Self::map_error)?;

        let mut summaries: Vec<DailySummary> = days
            .iter()
            .filter(|d| dates.contains(d.date))
            .map(Self::map_daily)
            .collect();
        summaries.sort_by_key(|d| d.date);

        debug!(days = summaries.len(), "Retrieved weather forecast");
        Ok(summaries)
    }

    #[instrument(skip(self), fields(lat = location.latitude(), lon = location.longitude(), date = %date))]
    async fn historical(
        &self,
        location: &GeoLocation,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<HistoricalObservation, ProviderError> {
        let observed = self
            .client
            .get_historical(location.latitude(), location.longitude(), date, today)
            .await
            .map_err(Self::map_error)?;

        debug!(condition = %observed.condition, "Retrieved historical weather");
        Ok(Self::map_observation(&observed))
    }

    #[instrument(skip(self))]
    async fn geocode(&self, name: &str) -> Result<Vec<GeocodeCandidate>, ProviderError> {
        let places = self
            .client
            .search_places(name)
            .await
            .map_err(Self::map_error)?;

        Ok(places.into_iter().filter_map(Self::map_place).collect())
    }
}
