//! Wire types for the Anthropic Messages API (`POST /v1/messages`).

use crate::types::{CompletionRequest, CompletionResponse, ContentBlock, Role, Usage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub messages: Vec<TurnMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<&'a [String]>,
}

/// A user or assistant turn; the API has no system role
#[derive(Debug, Serialize)]
pub struct TurnMessage {
    pub role: Role,
    pub content: Vec<TextBlock>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename = "text")]
pub struct TextBlock {
    pub text: String,
}

impl<'a> From<&'a CompletionRequest> for MessagesRequest<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        // System-role messages are folded into the top-level `system` field
        let mut system_parts: Vec<String> = request.system.iter().cloned().collect();
        let mut messages = Vec::with_capacity(request.messages.len());

        for message in &request.messages {
            let text = message.joined_text();
            match message.role {
                Role::System => system_parts.push(text),
                Role::User | Role::Assistant => messages.push(TurnMessage {
                    role: message.role.clone(),
                    content: vec![TextBlock { text }],
                }),
            }
        }

        Self {
            model: &request.model,
            max_tokens: request.max_tokens,
            messages,
            system: (!system_parts.is_empty()).then(|| system_parts.join("\n\n")),
            temperature: request.temperature,
            top_p: request.top_p,
            stop_sequences: request.stop_sequences.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ResponseBlock>,
    pub stop_reason: Option<String>,
    pub usage: MessagesUsage,
}

/// Only text blocks carry content we use
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct MessagesUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl From<MessagesResponse> for CompletionResponse {
    fn from(response: MessagesResponse) -> Self {
        CompletionResponse {
            content: response
                .content
                .into_iter()
                .filter_map(|block| match block {
                    ResponseBlock::Text { text } => Some(ContentBlock::Text { text }),
                    ResponseBlock::Other => None,
                })
                .collect(),
            role: Role::Assistant,
            usage: Usage {
                input_tokens: response.usage.input_tokens,
                output_tokens: response.usage.output_tokens,
            },
            stop_reason: response.stop_reason,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|body| body.error.message)
}
