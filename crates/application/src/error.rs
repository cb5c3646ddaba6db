//! Application-level errors
//!
//! `ApplicationError` covers startup and infrastructure failures. The other
//! enums describe why a single conversational turn could not be answered;
//! they are always recoverable and end up as a failure reply.

use chrono::NaiveDate;
use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Inference/AI error
    #[error("Inference error: {0}")]
    Inference(String),

    /// External service error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure to turn an utterance into a structured query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    /// The utterance is not about the weather
    #[error("utterance is not weather related")]
    NotWeatherRelated,

    /// The utterance could not be classified
    #[error("could not understand the request: {0}")]
    Ambiguous(String),

    /// The extraction backend could not be reached
    #[error("intent extraction unavailable: {0}")]
    Unavailable(String),
}

/// Failure to resolve a temporal expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// Not a recognized date expression
    #[error("unrecognized date expression: {0}")]
    Unparseable(String),

    /// A numeric date readable both day-first and month-first
    #[error("ambiguous date {input}: {day_first} or {month_first}")]
    Ambiguous {
        input: String,
        day_first: NaiveDate,
        month_first: NaiveDate,
    },

    /// A range reaching past the forecast horizon
    #[error("{input} reaches beyond the {horizon_days}-day forecast horizon")]
    OutOfRange { input: String, horizon_days: u32 },
}

/// Failure reported by a weather or geolocation provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Transport failure, timeout or server error
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The provider rejected the request due to rate limiting
    #[error("rate limited by provider")]
    RateLimited,

    /// The provider has no data for the request
    #[error("data not available: {0}")]
    NotAvailable(String),

    /// The provider does not recognize the location
    #[error("unknown location: {0}")]
    UnknownLocation(String),
}

/// Failure to resolve a location
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// No city given, nothing remembered and IP lookup failed
    #[error("location could not be detected: {0}")]
    Undetectable(String),

    /// The geocoder returned no candidates
    #[error("no place named {0}")]
    NotFound(String),

    /// The geocoder itself failed
    #[error("location lookup failed: {0}")]
    Lookup(#[from] ProviderError),
}

/// Intent and resolved date do not fit together
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Historical query for today or a future date
    #[error("historical date {date} is not before {today}")]
    HistoricalNotPast { date: NaiveDate, today: NaiveDate },

    /// Forecast query for a past date
    #[error("forecast date {date} is before {today}")]
    ForecastInPast { date: NaiveDate, today: NaiveDate },

    /// Forecast query past the forecast horizon
    #[error("forecast date {date} is more than {horizon_days} days ahead")]
    BeyondHorizon { date: NaiveDate, horizon_days: u32 },

    /// Historical query for more than one day
    #[error("historical lookups cover a single day, got {start} to {end}")]
    RangeNotSupported { start: NaiveDate, end: NaiveDate },
}

/// Any reason a turn produced a failure reply
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error(transparent)]
    Intent(#[from] IntentError),

    #[error(transparent)]
    Date(#[from] DateError),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl TurnError {
    /// Message shown to the user for this failure
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Intent(IntentError::NotWeatherRelated) => {
                "I can only help with weather questions. Try asking about the weather somewhere."
                    .to_string()
            },
            Self::Intent(IntentError::Ambiguous(_)) => {
                "Sorry, I didn't understand that. Try something like \"What's the weather in Paris tomorrow?\""
                    .to_string()
            },
            Self::Intent(IntentError::Unavailable(_)) => {
                "The language service is unavailable right now. Please try again shortly."
                    .to_string()
            },
            Self::Date(DateError::Unparseable(input)) => {
                format!("I couldn't work out which day \"{input}\" means.")
            },
            Self::Date(DateError::Ambiguous {
                input,
                day_first,
                month_first,
            }) => format!(
                "\"{input}\" could mean {} or {}. Please write the date as YYYY-MM-DD.",
                day_first.format("%-d %B %Y"),
                month_first.format("%-d %B %Y")
            ),
            Self::Date(DateError::OutOfRange {
                input,
                horizon_days,
            }) => format!(
                "\"{input}\" reaches too far ahead. Forecasts cover the next {horizon_days} days."
            ),
            Self::Location(LocationError::Undetectable(_)) => {
                "Could not determine location by IP. Please name a city.".to_string()
            },
            Self::Location(LocationError::NotFound(city)) => {
                format!("I couldn't find a place called \"{city}\".")
            },
            Self::Location(LocationError::Lookup(err)) => {
                format!("Looking up that location failed: {err}.")
            },
            Self::Validation(ValidationError::HistoricalNotPast { date, .. }) => format!(
                "{} isn't in the past, so there is no historical record yet. Ask for a forecast instead.",
                date.format("%-d %B %Y")
            ),
            Self::Validation(ValidationError::ForecastInPast { date, .. }) => format!(
                "{} is already in the past. Ask what the weather was like instead.",
                date.format("%-d %B %Y")
            ),
            Self::Validation(ValidationError::BeyondHorizon { date, horizon_days }) => format!(
                "{} is too far ahead. Forecasts cover the next {horizon_days} days.",
                date.format("%-d %B %Y")
            ),
            Self::Validation(ValidationError::RangeNotSupported { .. }) => {
                "Past weather can only be looked up one day at a time.".to_string()
            },
            Self::Provider(ProviderError::RateLimited) => {
                "The weather service is busy. Please try again in a moment.".to_string()
            },
            Self::Provider(ProviderError::NotAvailable(_)) => {
                "Weather data not available for this date.".to_string()
            },
            Self::Provider(ProviderError::UnknownLocation(place)) => {
                format!("The weather service doesn't know {place}.")
            },
            Self::Provider(ProviderError::NetworkFailure(_)) => {
                "Could not fetch weather data. Please try again later.".to_string()
            },
        }
    }
}
