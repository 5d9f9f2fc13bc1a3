use crate::completion::{complete_prompt, StageModel};
use crate::error::AgentError;
use crate::json_extract::extract_json;
use crate::prompts::classification_prompt;
use querypilot_llm_sdk::client::LlmClient;
use querypilot_llm_sdk::types::ResponseFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;


/// Purpose of a user message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    DatabaseQuery,
    StrategicAdvice,
    ClarificationNeeded {
        #[serde(default)]
        missing_info: Option<String>,
    },
    GeneralChat,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::DatabaseQuery => "database_query",
            Intent::StrategicAdvice => "strategic_advice",
            Intent::ClarificationNeeded { .. } => "clarification_needed",
            Intent::GeneralChat => "general_chat",
        }
    }
}

/// Decides which [`Intent`] a user message has
pub struct IntentClassifier {
    client: Arc<dyn LlmClient>,
    stage: StageModel,
}

impl IntentClassifier {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            stage: StageModel {
                model: model.into(),
                temperature,
                max_tokens: 500,
            },
        }
    }

    /// Classify `utterance` against the schema. A malformed response is an
    /// error; there is no default intent.
    pub async fn classify(
        &self,
        schema: &str,
        persona: &str,
        utterance: &str,
    ) -> Result<Intent, AgentError> {
        let prompt = classification_prompt(persona, schema, utterance).render();
        let text = complete_prompt(
            self.client.as_ref(),
            &self.stage,
            prompt,
            ResponseFormat::JsonObject,
        )
        .await?;

        let object = extract_json(&text)?;
        let intent: Intent = serde_json::from_value(Value::Object(object)).map_err(|e| {
            AgentError::ResponseParse(format!("Invalid classification: {}: {}", e, text))
        })?;

        tracing::debug!(intent = intent.as_str(), "Message classified");
        Ok(intent)
    }
}
