//! Natural-language questions over a relational database.
//!
//! A [`DatabaseChatAgent`] connects to PostgreSQL or MySQL, caches the
//! rendered schema, and answers each message by classifying its intent and
//! then either running a single validated read-only query and analyzing the
//! results, asking a clarification question, or chatting.

mod completion;
pub mod config;
pub mod database_chat;
pub mod error;
pub mod intent;
pub mod json_extract;
pub mod prompts;
pub mod schema_cache;
pub mod settings;
pub mod sql_generation;
pub mod synthesis;

#[cfg(test)]
mod test_support;

pub use database_chat::{ChatOptions, DatabaseChatAgent};
pub use error::AgentError;
pub use intent::{Intent, IntentClassifier};
pub use settings::{AgentSettings, ModelRouting, StageTemperatures};
pub use sql_generation::SqlGenerator;
pub use synthesis::AnswerSynthesizer;
