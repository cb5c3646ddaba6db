//! Port for secret storage and retrieval
//!
//! API keys for the language model and the weather provider are read
//! through this port at startup.

use async_trait::async_trait;

use crate::error::ApplicationError;

/// Port for secret storage operations
#[async_trait]
pub trait SecretStorePort: Send + Sync {
    /// Retrieve a secret by its key
    ///
    /// # Returns
    /// The secret value, or `ApplicationError::NotFound` if it is not set
    async fn get_secret(&self, key: &str) -> Result<String, ApplicationError>;
}
