//! Chat completion adapter - Implements InferencePort using ai_core

use std::time::Instant;

use ai_core::{
    InferenceConfig, InferenceEngine, InferenceError, InferenceRequest, OpenAiCompatibleEngine,
};
use application::{
    error::ApplicationError,
    ports::{InferencePort, InferenceResult},
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

/// Adapter for hosted OpenAI-compatible models
#[derive(Debug)]
pub struct OpenAiInferenceAdapter {
    engine: OpenAiCompatibleEngine,
}

impl OpenAiInferenceAdapter {
    /// Create a new adapter with the given configuration
    pub fn new(config: InferenceConfig, api_key: &SecretString) -> Result<Self, ApplicationError> {
        let engine = OpenAiCompatibleEngine::new(config, api_key.expose_secret())
            .map_err(|e| ApplicationError::Inference(e.to_string()))?;

        Ok(Self { engine })
    }

    /// Convert ai_core error to application error
    fn map_error(e: InferenceError) -> ApplicationError {
        match e {
            InferenceError::RateLimited => ApplicationError::RateLimited,
            InferenceError::ConnectionFailed(msg) => {
                ApplicationError::ExternalService(format!("Model connection failed: {msg}"))
            },
            InferenceError::Timeout(msg) => {
                ApplicationError::ExternalService(format!("Inference timeout: {msg}"))
            },
            InferenceError::Unauthorized(msg) => {
                ApplicationError::Configuration(format!("Model API key rejected: {msg}"))
            },
            other => ApplicationError::Inference(other.to_string()),
        }
    }

    async fn run(&self, request: InferenceRequest) -> Result<InferenceResult, ApplicationError> {
        let start = Instant::now();

        let response = self
            .engine
            .generate(request)
            .await
            .map_err(Self::map_error)?;

        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        debug!(
            model = %response.model,
            tokens = ?response.usage.as_ref().map(|u| u.total_tokens),
            latency_ms = latency_ms,
            "Inference completed"
        );

        Ok(InferenceResult {
            content: response.content,
            model: response.model,
            tokens_used: response.usage.map(|u| u.total_tokens),
            latency_ms,
        })
    }
}

#[async_trait]
impl InferencePort for OpenAiInferenceAdapter {
    #[instrument(skip(self, system_prompt, message), fields(message_len = message.len()))]
    async fn generate_with_system(
        &self,
        system_prompt: &str,
        message: &str,
    ) -> Result<InferenceResult, ApplicationError> {
        self.run(InferenceRequest::with_system(system_prompt, message))
            .await
    }

    fn current_model(&self) -> String {
        self.engine.default_model().to_string()
    }
}
