//! IP geolocation integration
//!
//! Client for ipinfo.io (<https://ipinfo.io>), used to guess where the
//! user is when a question names no place.

mod client;

pub use client::{GeoIpClient, GeoIpConfig, GeoIpError, IpInfo, IpInfoClient};
