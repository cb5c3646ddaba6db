//! Environment-based secret store adapter
//!
//! Reads API keys from environment variables.

use application::{error::ApplicationError, ports::SecretStorePort};
use async_trait::async_trait;
use std::env;
use tracing::{debug, instrument, warn};

/// Secret store that reads from environment variables
///
/// Keys are uppercased with slashes and hyphens replaced by underscores.
/// For example: "llm/api-key" becomes "LLM_API_KEY"
#[derive(Debug, Clone, Default)]
pub struct EnvSecretStore {
    /// Optional prefix for all environment variable lookups
    prefix: Option<String>,
}

impl EnvSecretStore {
    /// Create a new environment secret store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a prefix for all environment variable lookups
    ///
    /// # Example
    /// ```
    /// use infrastructure::adapters::EnvSecretStore;
    ///
    /// let store = EnvSecretStore::with_prefix("SKYQUERY");
    /// // Looking up "llm_api_key" will check "SKYQUERY_LLM_API_KEY"
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// Environment variable name for a key
    pub fn env_var_name(&self, key: &str) -> String {
        let normalized = key.replace(['/', '-'], "_").to_uppercase();

        match &self.prefix {
            Some(prefix) => format!("{prefix}_{normalized}"),
            None => normalized,
        }
    }
}

#[async_trait]
impl SecretStorePort for EnvSecretStore {
    #[instrument(skip(self), fields(env_var))]
    async fn get_secret(&self, key: &str) -> Result<String, ApplicationError> {
        let env_var = self.env_var_name(key);
        tracing::Span::current().record("env_var", env_var.as_str());

        match env::var(&env_var) {
            Ok(value) if value.trim().is_empty() => {
                warn!(env_var = %env_var, "Secret is set but empty");
                Err(ApplicationError::NotFound(format!(
                    "Secret is empty: {key} (env: {env_var})"
                )))
            },
            Ok(value) => {
                debug!("Retrieved secret from environment variable");
                Ok(value)
            },
            Err(env::VarError::NotPresent) => {
                warn!(env_var = %env_var, "Secret not found in environment");
                Err(ApplicationError::NotFound(format!(
                    "Secret not found: {key} (env: {env_var})"
                )))
            },
            Err(env::VarError::NotUnicode(_)) => Err(ApplicationError::Configuration(format!(
                "Secret contains invalid UTF-8: {env_var}"
            ))),
        }
    }
}
