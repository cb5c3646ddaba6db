//! IP geolocation adapter - Implements GeoLocationPort using integration_geoip

use application::error::{ApplicationError, ProviderError};
use application::ports::{GeoLocationPort, IpLocation};
use async_trait::async_trait;
use domain::value_objects::GeoLocation;
use integration_geoip::{GeoIpClient, GeoIpConfig, GeoIpError, IpInfo, IpInfoClient};
use tracing::{debug, instrument};

/// Adapter for ipinfo.io lookups
#[derive(Debug)]
pub struct GeoIpAdapter {
    client: IpInfoClient,
}

impl GeoIpAdapter {
    /// Create an adapter with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new(config: GeoIpConfig) -> Result<Self, ApplicationError> {
        let client =
            IpInfoClient::new(config).map_err(|e| ApplicationError::Internal(e.to_string()))?;
        Ok(Self { client })
    }

    fn map_error(err: GeoIpError) -> ProviderError {
        match err {
            GeoIpError::LocationUnknown(reason) => ProviderError::UnknownLocation(reason),
            GeoIpError::RateLimitExceeded => ProviderError::RateLimited,
            GeoIpError::ConnectionFailed(e)
            | GeoIpError::RequestFailed(e)
            | GeoIpError::ParseError(e)
            | GeoIpError::ServiceUnavailable(e) => ProviderError::NetworkFailure(e),
        }
    }

    fn map_info(info: IpInfo) -> Result<IpLocation, ProviderError> {
        let coordinates = GeoLocation::new(info.latitude, info.longitude)
            .map_err(|e| ProviderError::UnknownLocation(e.to_string()))?;
        Ok(IpLocation {
            coordinates,
            city: info.city,
            country: info.country,
        })
    }
}

#[async_trait]
impl GeoLocationPort for GeoIpAdapter {
    #[instrument(skip(self))]
    async fn locate(&self) -> Result<IpLocation, ProviderError> {
        let info = self.client.lookup().await.map_err(Self::map_error)?;
        let location = Self::map_info(info)?;
        debug!(city = ?location.city, "Resolved location from IP");
        Ok(location)
    }
}
