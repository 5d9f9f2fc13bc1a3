use crate::completion::{complete_prompt, StageModel};
use crate::error::AgentError;
use crate::json_extract::extract_json;
use crate::prompts::{sql_generation_prompt, QUERY_KEY};
use querypilot_llm_sdk::client::LlmClient;
use querypilot_llm_sdk::types::ResponseFormat;
use querypilot_tools::{validate_sql, DatabaseProvider, ValidatedSql};
use serde_json::Value;
use std::sync::Arc;


/// Turns a question into a single validated, read-only statement
pub struct SqlGenerator {
    client: Arc<dyn LlmClient>,
    stage: StageModel,
}

impl SqlGenerator {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            stage: StageModel {
                model: model.into(),
                temperature,
                max_tokens: 1000,
            },
        }
    }

    pub async fn generate(
        &self,
        schema: &str,
        utterance: &str,
        provider: DatabaseProvider,
    ) -> Result<ValidatedSql, AgentError> {
        let prompt = sql_generation_prompt(schema, utterance, provider).render();
        let text = complete_prompt(
            self.client.as_ref(),
            &self.stage,
            prompt,
            ResponseFormat::JsonObject,
        )
        .await?;

        let object = extract_json(&text)?;
        let candidate = match object.get(QUERY_KEY) {
            Some(Value::String(sql)) if !sql.trim().is_empty() => sql,
            Some(_) => {
                return Err(AgentError::ResponseParse(format!(
                    "'{}' must be a non-empty string: {}",
                    QUERY_KEY, text
                )))
            }
            None => {
                return Err(AgentError::ResponseParse(format!(
                    "missing '{}' key: {}",
                    QUERY_KEY, text
                )))
            }
        };

        match validate_sql(candidate) {
            Ok(sql) => {
                tracing::debug!(sql = %sql, "Generated SQL");
                Ok(sql)
            }
            Err(violation) => {
                tracing::warn!(sql = %candidate, %violation, "Rejected generated SQL");
                Err(AgentError::SqlSafetyViolation(violation))
            }
        }
    }
}
