//! API credentials
//!
//! Both keys are required; the session cannot start without them.

use application::{error::ApplicationError, ports::SecretStorePort};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use tracing::instrument;

/// Secret key for the language model API
pub const LLM_API_KEY: &str = "llm_api_key";

/// Secret key for the weather API
pub const WEATHER_API_KEY: &str = "weather_api_key";

/// Keys for the external services
#[derive(Clone)]
pub struct Credentials {
    /// Bearer token for the chat completion API
    pub llm_api_key: SecretString,
    /// `apikey` for the Open-Meteo customer endpoints
    pub weather_api_key: SecretString,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("llm_api_key", &"[REDACTED]")
            .field("weather_api_key", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Read both keys from a secret store
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` naming the missing key.
    #[instrument(skip(store))]
    pub async fn load(store: &dyn SecretStorePort) -> Result<Self, ApplicationError> {
        let llm_api_key = Self::require(store, LLM_API_KEY).await?;
        let weather_api_key = Self::require(store, WEATHER_API_KEY).await?;
        Ok(Self {
            llm_api_key,
            weather_api_key,
        })
    }

    async fn require(store: &dyn SecretStorePort, key: &str) -> Result<SecretString, ApplicationError> {
        match store.get_secret(key).await {
            Ok(value) => Ok(SecretString::from(value)),
            Err(ApplicationError::NotFound(detail)) => Err(ApplicationError::Configuration(
                format!("missing credential: {detail}"),
            )),
            Err(e) => Err(e),
        }
    }

    /// Whether both keys are non-empty
    pub fn is_complete(&self) -> bool {
        !self.llm_api_key.expose_secret().is_empty()
            && !self.weather_api_key.expose_secret().is_empty()
    }
}
