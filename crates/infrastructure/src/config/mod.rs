//! Application configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML file, then `SKYQUERY_*` environment variables. Nested keys use a
//! double underscore, e.g. `SKYQUERY_WEATHER__TIMEOUT_SECS=10`.

mod credentials;

use std::path::Path;

use ai_core::InferenceConfig;
use integration_geoip::GeoIpConfig;
use integration_weather::WeatherConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use credentials::{Credentials, LLM_API_KEY, WEATHER_API_KEY};

use crate::telemetry::LoggingConfig;

/// Prefix for environment overrides and credentials
pub const ENV_PREFIX: &str = "SKYQUERY";

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "skyquery";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language model configuration
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Weather provider configuration
    #[serde(default)]
    pub weather: WeatherConfig,

    /// IP geolocation configuration
    #[serde(default)]
    pub geoip: GeoIpConfig,

    /// Log output configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from defaults, a file and the environment
    ///
    /// With `path = None`, `skyquery.toml` in the working directory is used
    /// when present. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_with_env(path, Self::environment())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with_env(
        path: Option<&Path>,
        environment: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let builder = config::Config::builder()
            .add_source(file)
            .add_source(environment);

        let config: Self = builder.build()?.try_deserialize()?;
        debug!(
            model = %config.inference.default_model,
            weather_url = %config.weather.base_url,
            "Configuration loaded"
        );
        Ok(config)
    }
}
