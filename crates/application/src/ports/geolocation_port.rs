//! IP geolocation port
//!
//! Used to guess the user's location when no city was named and none is
//! remembered from an earlier turn.

use async_trait::async_trait;
use domain::value_objects::GeoLocation;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Approximate location of the caller's public IP address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpLocation {
    /// Coordinates reported for the address
    pub coordinates: GeoLocation,
    /// City name, if the service reported one
    pub city: Option<String>,
    /// Country code, if reported
    pub country: Option<String>,
}

/// Port for locating the current machine by IP
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GeoLocationPort: Send + Sync {
    /// Look up the public IP location
    async fn locate(&self) -> Result<IpLocation, ProviderError>;
}
