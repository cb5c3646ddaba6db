//! Application services - Use case implementations

mod conversation;
mod location_resolver;
pub mod reply_formatter;
mod weather_dispatcher;

pub use conversation::{ConversationSession, TurnOutcome};
pub use location_resolver::LocationResolver;
pub use weather_dispatcher::{WeatherDispatcher, validate_dates};
