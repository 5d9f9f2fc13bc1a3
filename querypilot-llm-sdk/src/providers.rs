//! Provider name constants

/// Anthropic (Claude) provider
pub const ANTHROPIC: &str = "anthropic";

/// OpenAI provider (also used for OpenAI-compatible gateways)
pub const OPENAI: &str = "openai";

/// Ollama local provider
pub const OLLAMA: &str = "ollama";
