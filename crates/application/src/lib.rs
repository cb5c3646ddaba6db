//! Application layer - Use cases and orchestration
//!
//! Turns a free-text weather question into a validated provider call and a
//! reply. Holds the port definitions that the infrastructure layer
//! implements, the deterministic date resolver, and the conversation core.

pub mod date_resolver;
pub mod error;
pub mod intent_parser;
pub mod ports;
pub mod services;

pub use date_resolver::{FORECAST_HORIZON_DAYS, TemporalLean};
pub use error::{
    ApplicationError, DateError, IntentError, LocationError, ProviderError, TurnError,
    ValidationError,
};
pub use intent_parser::LlmIntentExtractor;
pub use ports::*;
pub use services::*;
