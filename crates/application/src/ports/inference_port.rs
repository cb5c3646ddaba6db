//! Inference port - Interface for LLM inference

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Result of an inference call
#[derive(Debug, Clone)]
pub struct InferenceResult {
    /// Generated response content
    pub content: String,
    /// Model used for generation
    pub model: String,
    /// Number of tokens used (if available)
    pub tokens_used: Option<u32>,
    /// Latency in milliseconds
    pub latency_ms: u64,
}

/// Port for inference operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait InferencePort: Send + Sync {
    /// Generate a response with a specific system prompt
    async fn generate_with_system(
        &self,
        system_prompt: &str,
        message: &str,
    ) -> Result<InferenceResult, ApplicationError>;

    /// Get the name of the current model
    fn current_model(&self) -> String;
}
