//! Weather dispatcher - routes a structured query to the right retrieval
//!
//! Each turn passes four gates in order: location, date, validation and the
//! provider call. The first failure ends the turn with a failure reply.
//! Conversation state is only written after the provider succeeds.

use std::{fmt, sync::Arc};

use chrono::{Days, NaiveDate, NaiveDateTime};
use domain::{
    ConversationState, Intent, ResolvedLocation, StructuredQuery, WeatherReply,
    value_objects::ResolvedDate,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::{
    location_resolver::LocationResolver,
    reply_formatter::{format_current, format_forecast, format_historical},
};
use crate::{
    date_resolver::{FORECAST_HORIZON_DAYS, TemporalLean, resolve_leaning},
    error::{ProviderError, TurnError, ValidationError},
    ports::WeatherPort,
};

/// Check that the resolved days suit the intent
///
/// # Errors
///
/// - Historical: the day must be single and strictly before `today`
/// - Forecast: every day must lie in `today..=today + horizon`
pub fn validate_dates(
    intent: Intent,
    dates: &ResolvedDate,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    match intent {
        Intent::Current => Ok(()),
        Intent::Historical => {
            if !dates.is_single() {
                return Err(ValidationError::RangeNotSupported {
                    start: dates.first(),
                    end: dates.last(),
                });
            }
            if dates.first() >= today {
                return Err(ValidationError::HistoricalNotPast {
                    date: dates.first(),
                    today,
                });
            }
            Ok(())
        },
        Intent::Forecast => {
            if dates.first() < today {
                return Err(ValidationError::ForecastInPast {
                    date: dates.first(),
                    today,
                });
            }
            let limit = today + Days::new(u64::from(FORECAST_HORIZON_DAYS));
            if dates.last() > limit {
                return Err(ValidationError::BeyondHorizon {
                    date: dates.last(),
                    horizon_days: FORECAST_HORIZON_DAYS,
                });
            }
            Ok(())
        },
    }
}

/// Routes queries to the weather provider and formats the result
pub struct WeatherDispatcher {
    weather: Arc<dyn WeatherPort>,
    locations: LocationResolver,
}

impl fmt::Debug for WeatherDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherDispatcher")
            .field("locations", &self.locations)
            .finish_non_exhaustive()
    }
}

impl WeatherDispatcher {
    /// Create a dispatcher
    #[must_use]
    pub fn new(weather: Arc<dyn WeatherPort>, locations: LocationResolver) -> Self {
        Self { weather, locations }
    }

    /// Answer one query
    ///
    /// Never fails: every error becomes a failure reply. On success the
    /// resolved location is remembered in `state`.
    #[instrument(skip(self, query, state), fields(intent = %query.intent(), city = ?query.city()))]
    pub async fn handle(
        &self,
        query: &StructuredQuery,
        state: &mut ConversationState,
        now: NaiveDateTime,
    ) -> WeatherReply {
        match self.dispatch(query, state, now).await {
            Ok((location, reply)) => {
                info!(location = %location, "Weather query answered");
                state.remember_location(location);
                reply
            },
            Err(e) => {
                warn!(error = %e, "Weather query failed");
                WeatherReply::failure(e.user_message())
            },
        }
    }

    async fn dispatch(
        &self,
        query: &StructuredQuery,
        state: &ConversationState,
        now: NaiveDateTime,
    ) -> Result<(ResolvedLocation, WeatherReply), TurnError> {
        let location = self.locations.resolve(query.city(), state).await?;

        let today = now.date();
        let intent = query.intent();
        let dates = match intent {
            Intent::Current => ResolvedDate::single(today),
            Intent::Forecast => {
                resolve_leaning(query.temporal_expression(), now, TemporalLean::Future)?
            },
            Intent::Historical => {
                resolve_leaning(query.temporal_expression(), now, TemporalLean::Past)?
            },
        };
        validate_dates(intent, &dates, today)?;

        let coordinates = location.coordinates();
        debug!(
            lat = coordinates.latitude(),
            lon = coordinates.longitude(),
            dates = %dates,
            "Calling weather provider"
        );

        let reply = match intent {
            Intent::Current => {
                let current = self.weather.current(coordinates).await?;
                success(format_current(&location, &current), &current)
            },
            Intent::Forecast => {
                let days = self.weather.forecast(coordinates, &dates).await?;
                if days.is_empty() {
                    return Err(ProviderError::NotAvailable(format!("no forecast for {dates}")).into());
                }
                success(format_forecast(&location, &days, today), &days)
            },
            Intent::Historical => {
                let observed = self.weather.historical(coordinates, dates.first(), today).await?;
                success(format_historical(&location, &observed), &observed)
            },
        };
        Ok((location, reply))
    }
}

fn success<T: Serialize>(message: String, payload: &T) -> WeatherReply {
    WeatherReply::success(message, serde_json::to_value(payload).ok())
}
