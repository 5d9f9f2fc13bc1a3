use async_trait::async_trait;
use reqwest::header::{HeaderMap, AUTHORIZATION};

use crate::{
    client::LlmClient,
    error::LlmError,
    http::{require_api_key, secret_header, JsonTransport},
    openai::types::{error_message, ChatCompletionRequest, ChatCompletionResponse},
    types::{CompletionRequest, CompletionResponse},
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Client for OpenAI chat completions and compatible gateways
pub struct OpenAIClient {
    api_key: String,
    model: String,
    transport: JsonTransport,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        Ok(Self {
            api_key: require_api_key(api_key.into())?,
            model: crate::models::openai::GPT_4O_ID.to_string(),
            transport: JsonTransport::new(DEFAULT_BASE_URL, error_message)?,
        })
    }

    /// Point the client at an OpenAI-compatible gateway
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.transport.base_url = url.into();
        self
    }

    /// Set the model reported by [`LlmClient::model_name`]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            secret_header(&format!("Bearer {}", self.api_key))?,
        );

        let response: ChatCompletionResponse = self
            .transport
            .post(
                "/v1/chat/completions",
                headers,
                &ChatCompletionRequest::from(&request),
            )
            .await?;

        response
            .into_completion()
            .ok_or_else(|| LlmError::internal("No completion choices returned"))
    }

    fn provider_name(&self) -> &str {
        crate::providers::OPENAI
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
