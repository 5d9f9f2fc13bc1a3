//! Wire types for `POST /v1/chat/completions`.

use crate::types::{
    CompletionRequest, CompletionResponse, ContentBlock, ResponseFormat, Role, Usage,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormatSpec>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    /// Null when the model only refuses or calls tools
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormatSpec {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl<'a> From<&'a CompletionRequest> for ChatCompletionRequest<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        // The system prompt becomes the leading system message
        let system = request.system.iter().map(|text| ChatMessage {
            role: Role::System,
            content: Some(text.clone()),
        });
        let messages = system
            .chain(request.messages.iter().map(|message| ChatMessage {
                role: message.role.clone(),
                content: Some(message.joined_text()),
            }))
            .collect();

        Self {
            model: &request.model,
            messages,
            max_completion_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
            stop: request.stop_sequences.as_deref(),
            response_format: request.response_format.as_ref().map(|format| ResponseFormatSpec {
                kind: match format {
                    ResponseFormat::Text => "text",
                    ResponseFormat::JsonObject => "json_object",
                },
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatCompletionResponse {
    /// First choice as a generic response; `None` when no choice was returned
    pub fn into_completion(self) -> Option<CompletionResponse> {
        let usage = self
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();
        let choice = self.choices.into_iter().next()?;

        Some(CompletionResponse {
            content: vec![ContentBlock::Text {
                text: choice.message.content.unwrap_or_default(),
            }],
            role: Role::Assistant,
            usage,
            stop_reason: choice.finish_reason,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
}

pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|body| body.error.message)
}
