//! Clients for the external generation service.
//!
//! The pipeline talks to a [`GenerationClient`]; [`GeminiClient`] is the
//! production implementation over Gemini's `generateContent` endpoint.

pub mod client;
pub mod gemini;

pub use client::{GenerationClient, GenerationPayload};
pub use gemini::{GeminiClient, GeminiConfig};

#[cfg(test)]
pub mod testing;
