use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};

use crate::{
    claude::types::{error_message, MessagesRequest, MessagesResponse},
    client::LlmClient,
    error::LlmError,
    http::{require_api_key, secret_header, JsonTransport},
    types::{CompletionRequest, CompletionResponse},
};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Client for the Anthropic Messages API
pub struct ClaudeClient {
    api_key: String,
    model: String,
    transport: JsonTransport,
}

impl ClaudeClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        Ok(Self {
            api_key: require_api_key(api_key.into())?,
            model: crate::models::claude::SONNET_4_5_ID.to_string(),
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
impl LlmClient for ClaudeClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", secret_header(&self.api_key)?);
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));

        let response: MessagesResponse = self
            .transport
            .post("/v1/messages", headers, &MessagesRequest::from(&request))
            .await?;

        Ok(response.into())
    }

    fn provider_name(&self) -> &str {
        crate::providers::ANTHROPIC
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
