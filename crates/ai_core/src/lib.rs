//! AI Core - Chat completion client
//!
//! Provides the inference engine abstraction and an implementation for
//! hosted OpenAI-compatible chat completion APIs (Groq by default).

pub mod config;
pub mod error;
pub mod openai;
pub mod ports;

pub use config::InferenceConfig;
pub use error::InferenceError;
pub use openai::OpenAiCompatibleEngine;
pub use ports::{InferenceEngine, InferenceMessage, InferenceRequest, InferenceResponse, TokenUsage};
