//! OpenAI-compatible chat completions client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::InferenceConfig;
use crate::error::InferenceError;
use crate::ports::{
    InferenceEngine, InferenceMessage, InferenceRequest, InferenceResponse, TokenUsage,
};

/// Inference engine for hosted OpenAI-compatible APIs
pub struct OpenAiCompatibleEngine {
    client: Client,
    config: InferenceConfig,
    api_key: String,
}

impl std::fmt::Debug for OpenAiCompatibleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleEngine")
            .field("config", &self.config)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatibleEngine {
    /// Create a new engine authenticated with `api_key`
    pub fn new(config: InferenceConfig, api_key: impl Into<String>) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| InferenceError::ConnectionFailed(e.to_string()))?;

        info!(
            base_url = %config.base_url,
            model = %config.default_model,
            "Initialized chat completion engine"
        );

        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.bearer_auth(&self.api_key)
    }

    /// Map non-success statuses to errors
    async fn check_status(response: Response, model: &str) -> Result<Response, InferenceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, body = %body, "Inference request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => InferenceError::Unauthorized(body),
            StatusCode::TOO_MANY_REQUESTS => InferenceError::RateLimited,
            StatusCode::NOT_FOUND => InferenceError::ModelNotAvailable(model.to_string()),
            s if s.is_server_error() => InferenceError::ServerError(format!("Status {s}: {body}")),
            s => InferenceError::RequestFailed(format!("Status {s}: {body}")),
        })
    }
}

/// Chat completions request body
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [InferenceMessage],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

/// Chat completions response body
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl InferenceEngine for OpenAiCompatibleEngine {
    #[instrument(skip(self, request), fields(model = %self.config.default_model))]
    async fn generate(
        &self,
        request: InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError> {
        let model = self.config.default_model.as_str();

        let body = ChatCompletionRequest {
            model,
            messages: &request.messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            top_p: self.config.top_p,
            stream: false,
        };

        debug!("Sending chat completion request");

        let response = self
            .authorized(self.client.post(self.api_url("chat/completions")))
            .json(&body)
            .send()
            .await?;
        let response = Self::check_status(response, model).await?;

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| InferenceError::InvalidResponse("no choices returned".to_string()))?;

        debug!(tokens = ?completion.usage, "Inference completed");

        Ok(InferenceResponse {
            content: choice.message.content.unwrap_or_default(),
            model: completion.model,
            usage: completion.usage,
            finish_reason: choice.finish_reason,
        })
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_creates_correct_urls() {
        let engine = OpenAiCompatibleEngine::new(InferenceConfig::default(), "key").unwrap();

        assert_eq!(
            engine.api_url("chat/completions"),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(
            engine.api_url("/chat/completions"),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn trailing_slash_in_base_url_is_ignored() {
        let config = InferenceConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..Default::default()
        };
        let engine = OpenAiCompatibleEngine::new(config, "key").unwrap();
        assert_eq!(
            engine.api_url("chat/completions"),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn debug_hides_api_key() {
        let engine = OpenAiCompatibleEngine::new(InferenceConfig::default(), "gsk_secret").unwrap();
        let debug = format!("{engine:?}");
        assert!(!debug.contains("gsk_secret"));
        assert!(debug.contains("OpenAiCompatibleEngine"));
    }
}
