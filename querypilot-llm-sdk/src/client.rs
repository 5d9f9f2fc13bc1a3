use crate::{
    error::LlmError,
    types::{CompletionRequest, CompletionResponse},
};
use async_trait::async_trait;

/// Core trait for LLM clients
///
/// Every call is self-contained: the request carries the full prompt and the
/// client returns one completion. There is no streaming and no server-side
/// conversation state.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete a request (non-streaming)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Get provider name (e.g., "openai", "anthropic")
    fn provider_name(&self) -> &str;

    /// Get the default model name used when a request does not pick one
    fn model_name(&self) -> &str;
}
