//! The question-answering agent.
//!
//! [`DatabaseChatAgent::chat`] runs one sequential pass per message:
//! classify, then either generate, validate, execute and analyze, or reply
//! with a clarification question, or chat without touching the database.

use crate::error::AgentError;
use crate::intent::{Intent, IntentClassifier};
use crate::schema_cache::SchemaCache;
use crate::settings::AgentSettings;
use crate::sql_generation::SqlGenerator;
use crate::synthesis::AnswerSynthesizer;
use querypilot_llm_sdk::client::LlmClient;
use querypilot_tools::{
    ConnectionConfig, DatabaseClient, DatabaseConnector, DatabaseProvider, QueryExecutor,
    SqlxConnector,
};
use std::sync::Arc;
use tokio::sync::RwLock;

#[cfg(test)]
mod tests;

/// Per-call options for [`DatabaseChatAgent::chat`]
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    /// Replaces the configured persona for this call only
    pub system_prompt: Option<String>,
}

impl ChatOptions {
    pub fn with_system_prompt(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: Some(system_prompt.into()),
        }
    }
}

pub struct DatabaseChatAgent {
    settings: AgentSettings,
    connector: Arc<dyn DatabaseConnector>,
    connection: RwLock<Option<Arc<dyn DatabaseClient>>>,
    schema_cache: SchemaCache,
    classifier: IntentClassifier,
    generator: SqlGenerator,
    synthesizer: AnswerSynthesizer,
}

impl DatabaseChatAgent {
    pub fn new(client: Arc<dyn LlmClient>, settings: AgentSettings) -> Self {
        let default_model = client.model_name().to_string();
        let model_for = |stage: &Option<String>| {
            stage.clone().unwrap_or_else(|| default_model.clone())
        };

        let classifier = IntentClassifier::new(
            client.clone(),
            model_for(&settings.routing.classification),
            settings.temperatures.classification,
        );
        let generator = SqlGenerator::new(
            client.clone(),
            model_for(&settings.routing.sql_generation),
            settings.temperatures.sql_generation,
        );
        let synthesizer = AnswerSynthesizer::new(
            client,
            model_for(&settings.routing.synthesis),
            settings.temperatures.synthesis,
        );

        Self {
            settings,
            connector: Arc::new(SqlxConnector::default()),
            connection: RwLock::new(None),
            schema_cache: SchemaCache::new(),
            classifier,
            generator,
            synthesizer,
        }
    }

    /// Use a different way of opening database connections
    pub fn with_connector(mut self, connector: Arc<dyn DatabaseConnector>) -> Self {
        self.connector = connector;
        self
    }

    /// Open a connection and load its schema.
    ///
    /// The new connection replaces the active one only once its schema has
    /// been loaded; on failure the previous connection stays active.
    pub async fn connect(
        &self,
        provider: DatabaseProvider,
        config: impl Into<ConnectionConfig>,
    ) -> Result<(), AgentError> {
        let config: ConnectionConfig = config.into();
        let target = config.resolve(provider)?;

        let client = self
            .connector
            .connect(provider, &target)
            .await
            .map_err(AgentError::connection_failure)?;

        if let Err(e) = self.schema_cache.get(client.as_ref(), true).await {
            client.close().await;
            return Err(AgentError::connection_failure(e));
        }

        tracing::info!(
            provider = %provider,
            database = %client.identity(),
            "Connected"
        );

        // The replaced pool is released once in-flight calls drop their handles
        *self.connection.write().await = Some(client);
        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        self.connection.read().await.is_some()
    }

    /// Close the active connection and forget its schema
    pub async fn disconnect(&self) {
        let previous = self.connection.write().await.take();
        self.schema_cache.clear().await;
        if let Some(client) = previous {
            client.close().await;
            tracing::info!(database = %client.identity(), "Disconnected");
        }
    }

    async fn active_connection(&self) -> Result<Arc<dyn DatabaseClient>, AgentError> {
        self.connection
            .read()
            .await
            .clone()
            .ok_or(AgentError::NotConnected)
    }

    /// Rendered schema of the active connection
    pub async fn get_schema(&self, force_refresh: bool) -> Result<String, AgentError> {
        let client = self.active_connection().await?;
        let text = self
            .schema_cache
            .get(client.as_ref(), force_refresh)
            .await
            .map_err(AgentError::connection_failure)?;
        Ok(text.to_string())
    }

    /// Answer one user message
    pub async fn chat(&self, utterance: &str, options: ChatOptions) -> Result<String, AgentError> {
        let client = self.active_connection().await?;
        let persona = options
            .system_prompt
            .as_deref()
            .unwrap_or(&self.settings.persona);

        let schema = self
            .schema_cache
            .get(client.as_ref(), false)
            .await
            .map_err(AgentError::connection_failure)?;

        let intent = self.classifier.classify(&schema, persona, utterance).await?;
        tracing::debug!(intent = intent.as_str(), "Routing message");

        match intent {
            Intent::DatabaseQuery | Intent::StrategicAdvice => {
                let sql = self
                    .generator
                    .generate(&schema, utterance, client.provider())
                    .await?;

                let executor = QueryExecutor::new(client.clone(), self.settings.max_result_rows);
                let result = executor.execute(sql).await?;

                self.synthesizer.analyze(persona, utterance, &result).await
            }
            Intent::ClarificationNeeded { missing_info } => {
                Ok(self.synthesizer.clarify(missing_info.as_deref()))
            }
            Intent::GeneralChat => self.synthesizer.converse(persona, utterance).await,
        }
    }
}
