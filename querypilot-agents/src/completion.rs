use crate::error::AgentError;
use querypilot_llm_sdk::client::LlmClient;
use querypilot_llm_sdk::types::{CompletionRequest, Message, ResponseFormat};

/// Model settings for one pipeline stage
#[derive(Debug, Clone)]
pub(crate) struct StageModel {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Send a single self-contained prompt and return the completion text
pub(crate) async fn complete_prompt(
    client: &dyn LlmClient,
    stage: &StageModel,
    prompt: String,
    format: ResponseFormat,
) -> Result<String, AgentError> {
    let request = CompletionRequest::new(stage.model.clone(), vec![Message::user(prompt)])
        .with_max_tokens(stage.max_tokens)
        .with_temperature(stage.temperature)
        .with_response_format(format);

    tracing::debug!(
        provider = client.provider_name(),
        model = %stage.model,
        "Sending completion request"
    );

    let response = client.complete(request).await?;

    tracing::debug!(
        input_tokens = response.usage.input_tokens,
        output_tokens = response.usage.output_tokens,
        "Completion received"
    );

    Ok(response.text())
}
