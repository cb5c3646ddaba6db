//! Conversation session - the core of the interactive loop
//!
//! Owns the per-session state and runs one turn per utterance. Reading
//! input and printing replies is left to the presentation layer.

use std::{fmt, sync::Arc};

use chrono::NaiveDateTime;
use domain::{ConversationState, WeatherReply};
use tracing::{debug, instrument};

use super::weather_dispatcher::WeatherDispatcher;
use crate::{
    error::TurnError,
    ports::{ExtractionContext, IntentExtractor},
};

/// Word that ends the session
const EXIT_COMMAND: &str = "exit";

/// What the shell should do after a turn
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The user asked to leave
    Exit,
    /// Blank input; nothing to answer
    Empty,
    /// A reply to show
    Reply(WeatherReply),
}

/// One user's conversation
pub struct ConversationSession {
    extractor: Arc<dyn IntentExtractor>,
    dispatcher: WeatherDispatcher,
    state: ConversationState,
}

impl fmt::Debug for ConversationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationSession")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ConversationSession {
    /// Start a session with empty state
    #[must_use]
    pub fn new(extractor: Arc<dyn IntentExtractor>, dispatcher: WeatherDispatcher) -> Self {
        Self {
            extractor,
            dispatcher,
            state: ConversationState::new(),
        }
    }

    /// Current session state
    #[must_use]
    pub const fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Run one turn
    #[instrument(skip(self, utterance), fields(input_len = utterance.len()))]
    pub async fn respond(&mut self, utterance: &str, now: NaiveDateTime) -> TurnOutcome {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return TurnOutcome::Empty;
        }
        if utterance.eq_ignore_ascii_case(EXIT_COMMAND) {
            debug!("Exit requested");
            return TurnOutcome::Exit;
        }

        let context = ExtractionContext {
            today: now.date(),
            last_city: self
                .state
                .last_location()
                .map(|loc| loc.name().to_string()),
        };

        let reply = match self.extractor.extract(utterance, &context).await {
            Ok(query) => self.dispatcher.handle(&query, &mut self.state, now).await,
            Err(e) => {
                debug!(error = %e, "Intent extraction failed");
                WeatherReply::failure(TurnError::from(e).user_message())
            },
        };
        TurnOutcome::Reply(reply)
    }
}
