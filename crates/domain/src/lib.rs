//! Domain layer for SkyQuery
//!
//! Contains the weather query model, resolved parameters, conversation state,
//! and domain errors. This layer knows nothing about HTTP, LLMs, or terminals.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
