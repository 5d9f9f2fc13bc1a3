use async_trait::async_trait;
use reqwest::header::HeaderMap;

use crate::{
    client::LlmClient,
    error::LlmError,
    http::JsonTransport,
    ollama::types::{error_message, ChatRequest, ChatResponse},
    types::{CompletionRequest, CompletionResponse},
};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Client for a local Ollama server
pub struct OllamaClient {
    model: String,
    transport: JsonTransport,
}

impl OllamaClient {
    pub fn new() -> Result<Self, LlmError> {
        Ok(Self {
            model: crate::models::ollama::LLAMA_3_1_8B_ID.to_string(),
            transport: JsonTransport::new(DEFAULT_BASE_URL, error_message)?,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.transport.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let response: ChatResponse = self
            .transport
            .post("/api/chat", HeaderMap::new(), &ChatRequest::from(&request))
            .await?;

        Ok(response.into())
    }

    fn provider_name(&self) -> &str {
        crate::providers::OLLAMA
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
