//! OpenAI-compatible inference engine
//!
//! Talks to any `/chat/completions` endpoint that accepts bearer auth,
//! such as Groq.

mod client;

pub use client::OpenAiCompatibleEngine;
