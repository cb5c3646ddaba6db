//! A location resolved to a canonical name and coordinates

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::GeoLocation;

/// Population above which a place is treated as a large area
pub const LARGE_AREA_POPULATION: u64 = 1_000_000;

/// How a location was obtained for a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    /// Looked up from a city name
    Geocoded,
    /// Reused from an earlier turn of the conversation
    Remembered,
    /// Derived from the caller's public IP address
    IpLookup,
}

/// Canonical location usable by the weather provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    name: String,
    coordinates: GeoLocation,
    country: Option<String>,
    population: Option<u64>,
    source: LocationSource,
}

impl ResolvedLocation {
    /// Create a resolved location
    #[must_use]
    pub fn new(name: impl Into<String>, coordinates: GeoLocation, source: LocationSource) -> Self {
        Self {
            name: name.into(),
            coordinates,
            country: None,
            population: None,
            source,
        }
    }

    /// Attach a country name
    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Attach a population figure
    #[must_use]
    pub const fn with_population(mut self, population: u64) -> Self {
        self.population = Some(population);
        self
    }

    /// Copy of this location marked as reused from conversation memory
    #[must_use]
    pub fn remembered(&self) -> Self {
        Self {
            source: LocationSource::Remembered,
            ..self.clone()
        }
    }

    /// Canonical place name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Coordinates
    #[must_use]
    pub const fn coordinates(&self) -> &GeoLocation {
        &self.coordinates
    }

    /// Country, when known
    #[must_use]
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// Population, when known
    #[must_use]
    pub const fn population(&self) -> Option<u64> {
        self.population
    }

    /// How this location was obtained
    #[must_use]
    pub const fn source(&self) -> LocationSource {
        self.source
    }

    /// Whether the place is big enough that weather may vary across it
    #[must_use]
    pub fn is_large_area(&self) -> bool {
        self.population
            .is_some_and(|population| population >= LARGE_AREA_POPULATION)
    }
}

impl fmt::Display for ResolvedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) if !country.is_empty() => write!(f, "{}, {country}", self.name),
            _ => f.write_str(&self.name),
        }
    }
}
