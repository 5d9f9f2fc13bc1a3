//! # Querypilot LLM SDK
//!
//! A small provider-agnostic completion client. Every provider implements
//! [`client::LlmClient`], which takes a single [`types::CompletionRequest`] and
//! returns a single non-streaming [`types::CompletionResponse`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use querypilot_llm_sdk::client::LlmClient;
//! use querypilot_llm_sdk::openai::OpenAIClient;
//! use querypilot_llm_sdk::types::{CompletionRequest, Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenAIClient::new("your-api-key")?;
//!     let request = CompletionRequest::new(client.model_name(), vec![Message::user("Hello!")]);
//!     let response = client.complete(request).await?;
//!     println!("Response: {}", response.text());
//!     Ok(())
//! }
//! ```

pub mod claude;
pub mod client;
pub mod error;
mod http;
pub mod models;
pub mod ollama;
pub mod openai;
pub mod providers;
pub mod types;
