//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod env_secret_store;
mod geoip_adapter;
mod openai_inference_adapter;
mod weather_adapter;

pub use env_secret_store::EnvSecretStore;
pub use geoip_adapter::GeoIpAdapter;
pub use openai_inference_adapter::OpenAiInferenceAdapter;
pub use weather_adapter::WeatherAdapter;
