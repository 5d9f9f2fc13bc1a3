//! Ollama local model client

pub mod client;
pub mod types;

pub use client::OllamaClient;
