//! Per-session conversation state

use serde::{Deserialize, Serialize};

use super::ResolvedLocation;

/// The only state carried between turns of a conversation
///
/// Read by location resolution; written only after a turn fully succeeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    last_location: Option<ResolvedLocation>,
}

impl ConversationState {
    /// Fresh state with nothing remembered
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently used location, if any
    #[must_use]
    pub const fn last_location(&self) -> Option<&ResolvedLocation> {
        self.last_location.as_ref()
    }

    /// Remember the location of a successful turn
    pub fn remember_location(&mut self, location: ResolvedLocation) {
        self.last_location = Some(location);
    }
}
