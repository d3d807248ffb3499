//! # newswire-inference
//!
//! Inference backend implementations for newswire:
//!
//! - `ollama`: embedding (`/api/embed`) and generation (`/api/generate`)
//!   against a local or remote Ollama instance
//! - `mock`: deterministic backend for tests

pub mod mock;
pub mod ollama;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;
