//! Wire types for the Ollama chat endpoint (`POST /api/chat`).

use crate::types::{
    CompletionRequest, CompletionResponse, ContentBlock, ResponseFormat, Role, Usage,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    /// `"json"` constrains the output to a JSON value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
    pub options: GenerationOptions<'a>,
    /// Ollama streams unless told otherwise
    pub stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Default, Serialize)]
pub struct GenerationOptions<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

impl<'a> From<&'a CompletionRequest> for ChatRequest<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        let system = request.system.iter().map(|text| ChatMessage {
            role: Role::System,
            content: text.clone(),
        });
        let messages = system
            .chain(request.messages.iter().map(|message| ChatMessage {
                role: message.role.clone(),
                content: message.joined_text(),
            }))
            .collect();

        Self {
            model: &request.model,
            messages,
            format: matches!(request.response_format, Some(ResponseFormat::JsonObject))
                .then_some("json"),
            options: GenerationOptions {
                temperature: request.temperature,
                top_p: request.top_p,
                stop: request.stop_sequences.as_deref(),
                num_predict: (request.max_tokens > 0).then_some(request.max_tokens),
            },
            stream: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
    #[serde(default)]
    pub done_reason: Option<String>,
    #[serde(default)]
    pub prompt_eval_count: Option<u32>,
    #[serde(default)]
    pub eval_count: Option<u32>,
}

impl From<ChatResponse> for CompletionResponse {
    fn from(response: ChatResponse) -> Self {
        CompletionResponse {
            content: vec![ContentBlock::Text {
                text: response.message.content,
            }],
            role: Role::Assistant,
            usage: Usage {
                input_tokens: response.prompt_eval_count.unwrap_or(0),
                output_tokens: response.eval_count.unwrap_or(0),
            },
            stop_reason: response.done_reason,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|body| body.error)
}
