use crate::completion::{complete_prompt, StageModel};
use crate::error::AgentError;
use crate::prompts::{analysis_prompt, clarification_response, conversation_prompt};
use querypilot_llm_sdk::client::LlmClient;
use querypilot_llm_sdk::types::ResponseFormat;
use querypilot_tools::QueryResultSet;
use std::sync::Arc;

/// Produces the final natural-language reply
pub struct AnswerSynthesizer {
    client: Arc<dyn LlmClient>,
    stage: StageModel,
}

impl AnswerSynthesizer {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            stage: StageModel {
                model: model.into(),
                temperature,
                max_tokens: 2000,
            },
        }
    }

    /// Answer a data question from its query results
    pub async fn analyze(
        &self,
        persona: &str,
        question: &str,
        result: &QueryResultSet,
    ) -> Result<String, AgentError> {
        let prompt = analysis_prompt(persona, question, result).render();
        self.reply(prompt).await
    }

    /// Short in-character reply to a message unrelated to the data
    pub async fn converse(&self, persona: &str, utterance: &str) -> Result<String, AgentError> {
        let prompt = conversation_prompt(persona, utterance).render();
        self.reply(prompt).await
    }

    /// Ask the user for what is missing. Does not call the model.
    pub fn clarify(&self, missing_info: Option<&str>) -> String {
        clarification_response(missing_info)
    }

    async fn reply(&self, prompt: String) -> Result<String, AgentError> {
        let text = complete_prompt(
            self.client.as_ref(),
            &self.stage,
            prompt,
            ResponseFormat::Text,
        )
        .await?;
        Ok(text.trim().to_string())
    }
}
