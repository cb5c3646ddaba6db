//! Domain entities - Query, location, conversation and reply types

mod conversation_state;
mod query;
mod resolved_location;
mod weather_reply;

pub use conversation_state::ConversationState;
pub use query::{Intent, StructuredQuery};
pub use resolved_location::{LocationSource, ResolvedLocation};
pub use weather_reply::WeatherReply;
