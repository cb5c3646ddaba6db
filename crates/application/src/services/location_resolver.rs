//! Location resolution
//!
//! Turns an optional city name into coordinates. Falls back to the location
//! remembered from an earlier turn, then to IP geolocation.

use std::{fmt, sync::Arc};

use domain::{ConversationState, LocationSource, ResolvedLocation};
use tracing::{debug, instrument, warn};

use crate::{
    error::LocationError,
    ports::{GeoLocationPort, GeocodeCandidate, WeatherPort},
};

/// Resolves place names and missing locations
pub struct LocationResolver {
    weather: Arc<dyn WeatherPort>,
    geolocation: Arc<dyn GeoLocationPort>,
}

impl fmt::Debug for LocationResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationResolver").finish_non_exhaustive()
    }
}

impl LocationResolver {
    /// Create a resolver over a geocoder and an IP locator
    #[must_use]
    pub fn new(weather: Arc<dyn WeatherPort>, geolocation: Arc<dyn GeoLocationPort>) -> Self {
        Self {
            weather,
            geolocation,
        }
    }

    /// Resolve `city_text`, or fall back when it is absent
    ///
    /// Reads `state` but never modifies it.
    ///
    /// # Errors
    ///
    /// - `LocationError::NotFound` if the geocoder has no match
    /// - `LocationError::Lookup` if the geocoder fails
    /// - `LocationError::Undetectable` if no city was given, nothing is
    ///   remembered and IP lookup fails
    #[instrument(skip(self, state), fields(city = ?city_text))]
    pub async fn resolve(
        &self,
        city_text: Option<&str>,
        state: &ConversationState,
    ) -> Result<ResolvedLocation, LocationError> {
        if let Some(city) = city_text.and_then(clean_city) {
            return self.geocode(&city).await;
        }

        if let Some(last) = state.last_location() {
            debug!(location = %last, "Reusing remembered location");
            return Ok(last.remembered());
        }

        self.locate_by_ip().await
    }

    async fn geocode(&self, city: &str) -> Result<ResolvedLocation, LocationError> {
        let candidates = self.weather.geocode(city).await?;
        debug!(count = candidates.len(), "Geocoder returned candidates");

        let best = select_candidate(&city.to_lowercase(), candidates)
            .ok_or_else(|| LocationError::NotFound(city.to_string()))?;

        let mut location =
            ResolvedLocation::new(best.name, best.coordinates, LocationSource::Geocoded);
        if let Some(country) = best.country {
            location = location.with_country(country);
        }
        if let Some(population) = best.population {
            location = location.with_population(population);
        }
        debug!(location = %location, population = ?location.population(), "Resolved city");
        Ok(location)
    }

    async fn locate_by_ip(&self) -> Result<ResolvedLocation, LocationError> {
        let found = self.geolocation.locate().await.map_err(|e| {
            warn!(error = %e, "IP geolocation failed");
            LocationError::Undetectable(e.to_string())
        })?;

        let name = found
            .city
            .clone()
            .unwrap_or_else(|| found.coordinates.to_string());
        let mut location = ResolvedLocation::new(name, found.coordinates, LocationSource::IpLookup);
        if let Some(country) = found.country {
            location = location.with_country(country);
        }
        debug!(location = %location, "Resolved location from IP");
        Ok(location)
    }
}

/// Trim, collapse whitespace and drop trailing punctuation
///
/// Returns `None` when nothing is left.
fn clean_city(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = collapsed.trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace());
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Pick the best geocoder candidate for a case-folded query
///
/// Exact name matches are preferred over partial ones. Among the eligible
/// candidates the largest population wins, with unknown population counted
/// as zero; ties keep the provider's order.
fn select_candidate(
    folded_query: &str,
    candidates: Vec<GeocodeCandidate>,
) -> Option<GeocodeCandidate> {
    let has_exact = candidates
        .iter()
        .any(|c| c.name.to_lowercase() == folded_query);

    candidates
        .into_iter()
        .filter(|c| !has_exact || c.name.to_lowercase() == folded_query)
        .reduce(|best, next| {
            if next.population.unwrap_or(0) > best.population.unwrap_or(0) {
                next
            } else {
                best
            }
        })
}
