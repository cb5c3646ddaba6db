//! Intent extraction port
//!
//! Turns one raw utterance into a `StructuredQuery`. Implementations may be
//! backed by a language model or by fixed rules; the rest of the
//! application only depends on this boundary.

use async_trait::async_trait;
use chrono::NaiveDate;
use domain::StructuredQuery;
#[cfg(test)]
use mockall::automock;

use crate::error::IntentError;

/// What an extractor may know about the conversation so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionContext {
    /// Reference day for the turn
    pub today: NaiveDate,
    /// Name of the most recently used location
    pub last_city: Option<String>,
}

/// Port for classifying an utterance
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IntentExtractor: Send + Sync {
    /// Extract intent and raw slots from an utterance
    async fn extract(
        &self,
        utterance: &str,
        context: &ExtractionContext,
    ) -> Result<StructuredQuery, IntentError>;
}
