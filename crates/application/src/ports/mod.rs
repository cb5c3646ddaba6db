//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod geolocation_port;
mod inference_port;
mod intent_port;
mod secret_store;
mod weather_port;

#[cfg(test)]
pub use geolocation_port::MockGeoLocationPort;
pub use geolocation_port::{GeoLocationPort, IpLocation};
#[cfg(test)]
pub use inference_port::MockInferencePort;
pub use inference_port::{InferencePort, InferenceResult};
#[cfg(test)]
pub use intent_port::MockIntentExtractor;
pub use intent_port::{ExtractionContext, IntentExtractor};
pub use secret_store::SecretStorePort;
#[cfg(test)]
pub use weather_port::MockWeatherPort;
pub use weather_port::{
    CurrentConditions, DailySummary, GeocodeCandidate, HistoricalObservation, WeatherCondition,
    WeatherPort,
};
