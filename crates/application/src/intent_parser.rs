//! LLM-powered intent extraction
//!
//! The model only classifies the question and copies the place and time
//! phrases out of it. Turning those phrases into coordinates and calendar
//! days happens later in deterministic code.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use domain::{Intent, StructuredQuery};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::{
    error::IntentError,
    ports::{ExtractionContext, InferencePort, IntentExtractor},
};

/// System prompt for weather intent classification
const INTENT_SYSTEM_PROMPT: &str = r#"You are an intent classifier for a weather assistant.
Analyze the user input and extract the intent as JSON.

Possible intents:
- "current": Weather right now (e.g., "What's the weather in Paris?", "Is it raining?")
- "forecast": Weather later today or on a future day (e.g., "Will it rain tomorrow in Oslo?", "Weekend weather")
- "historical": Weather on a past day (e.g., "How hot was it in Tokyo 3 days ago?")
- "not_weather": The input is not about the weather
- "unclear": The input is about the weather but you cannot tell what is asked

Reply ONLY with valid JSON:
{
  "intent": "<intent_name>",
  "city": "..." (the place exactly as the user named it, or null if none),
  "date": "..." (the time phrase copied verbatim from the input, or null if none)
}

Rules:
- Never compute or reformat dates. Copy phrases like "tomorrow", "3 days ago", "next friday" or "07/06/2024" word for word.
- Never guess a city the user did not name. Words like "here" or "there" mean null.
- Use the supplied current date only to decide between forecast and historical.
- A supplied last city is conversation context only. Keep "city" null unless the input names a place.

Examples:
- "What's the weather in New York?" → {"intent":"current","city":"New York","date":null}
- "how hot was it in Tokyo 3 days ago" → {"intent":"historical","city":"Tokyo","date":"3 days ago"}
- "Will it snow this weekend?" → {"intent":"forecast","city":null,"date":"this weekend"}
- "weather in berlin after 3 days" → {"intent":"forecast","city":"berlin","date":"after 3 days"}
- "Tell me a joke" → {"intent":"not_weather","city":null,"date":null}"#;

/// Raw JSON shape returned by the model
#[derive(Debug, Deserialize)]
struct ParsedIntent {
    intent: String,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

/// Intent extractor backed by a language model
pub struct LlmIntentExtractor {
    inference: Arc<dyn InferencePort>,
}

impl std::fmt::Debug for LlmIntentExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmIntentExtractor")
            .field("model", &self.inference.current_model())
            .finish()
    }
}

impl LlmIntentExtractor {
    /// Create an extractor over an inference backend
    #[must_use]
    pub fn new(inference: Arc<dyn InferencePort>) -> Self {
        Self { inference }
    }

    /// Interpret the model's reply
    fn parse_response(response: &str, utterance: &str) -> Result<StructuredQuery, IntentError> {
        let json_str = extract_json(response);
        let parsed: ParsedIntent = serde_json::from_str(json_str)
            .map_err(|e| IntentError::Ambiguous(format!("unreadable classifier output: {e}")))?;

        let intent = match parsed.intent.trim().to_lowercase().as_str() {
            "not_weather" | "not_weather_related" | "other" => {
                return Err(IntentError::NotWeatherRelated);
            },
            "unclear" | "unknown" => return Err(IntentError::Ambiguous(utterance.to_string())),
            other => other
                .parse::<Intent>()
                .map_err(|_| IntentError::Ambiguous(utterance.to_string()))?,
        };

        let date = parsed
            .date
            .filter(|d| !d.trim().is_empty() && !d.trim().eq_ignore_ascii_case("null"))
            .or_else(|| find_iso_date(utterance));

        Ok(StructuredQuery::new(intent, parsed.city, date))
    }
}

#[async_trait]
impl IntentExtractor for LlmIntentExtractor {
    #[instrument(skip(self, utterance, context), fields(input_len = utterance.len()))]
    async fn extract(
        &self,
        utterance: &str,
        context: &ExtractionContext,
    ) -> Result<StructuredQuery, IntentError> {
        let message = prompt_message(utterance, context);

        let result = self
            .inference
            .generate_with_system(INTENT_SYSTEM_PROMPT, &message)
            .await
            .map_err(|e| {
                warn!(error = %e, "Intent extraction backend failed");
                IntentError::Unavailable(e.to_string())
            })?;

        match Self::parse_response(&result.content, utterance) {
            Ok(query) => {
                debug!(
                    intent = %query.intent(),
                    city = ?query.city(),
                    date = ?query.temporal_expression(),
                    "Extracted weather query"
                );
                Ok(query)
            },
            Err(e) => {
                warn!(error = %e, response = %result.content, "Could not classify utterance");
                Err(e)
            },
        }
    }
}

/// User message carrying the turn context ahead of the utterance
fn prompt_message(utterance: &str, context: &ExtractionContext) -> String {
    match &context.last_city {
        Some(city) => format!(
            "Current date: {}\nLast city: {city}\nInput: {utterance}",
            context.today
        ),
        None => format!("Current date: {}\nInput: {utterance}", context.today),
    }
}

/// Extract JSON from a response that might contain markdown or prose
fn extract_json(response: &str) -> &str {
    let response = response.trim();

    // Handle ```json ... ``` blocks
    if let Some(start) = response.find("```json") {
        if let Some(end) = response[start + 7..].find("```") {
            return response[start + 7..start + 7 + end].trim();
        }
    }

    // Handle ``` ... ``` blocks
    if let Some(start) = response.find("```") {
        if let Some(end) = response[start + 3..].find("```") {
            return response[start + 3..start + 3 + end].trim();
        }
    }

    // Handle { ... } directly; malformed input like "} {" falls through
    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if start <= end {
                return &response[start..=end];
            }
        }
    }

    response
}

/// First `YYYY-MM-DD` token in free text
fn find_iso_date(text: &str) -> Option<String> {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '-'))
        .find(|word| NaiveDate::parse_from_str(word, "%Y-%m-%d").is_ok())
        .map(ToString::to_string)
}
