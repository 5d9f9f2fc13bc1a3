use crate::settings::{AgentSettings, ModelRouting, StageTemperatures, DEFAULT_PERSONA};
use querypilot_llm_sdk::claude::ClaudeClient;
use querypilot_llm_sdk::client::LlmClient;
use querypilot_llm_sdk::ollama::OllamaClient;
use querypilot_llm_sdk::openai::OpenAIClient;
use querypilot_llm_sdk::providers;
use querypilot_tools::{ConnectionConfig, ConnectionParameters, DatabaseProvider};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub api_keys: HashMap<String, toml::Value>,
    #[serde(default)]
    pub agent: AgentConfig,
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LlmConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AgentConfig {
    pub persona: Option<String>,
    #[serde(default)]
    pub models: ModelRouting,
    #[serde(default)]
    pub temperatures: StageTemperatures,
    pub max_result_rows: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    pub provider: String,
    pub connection_string: Option<String>,
    #[serde(flatten)]
    pub parameters: ConnectionParameters,
}

impl DatabaseConfig {
    /// Provider and connection target; a non-empty `connection_string` wins
    /// over structured parameters
    pub fn connection(&self) -> anyhow::Result<(DatabaseProvider, ConnectionConfig)> {
        let provider: DatabaseProvider = self.provider.parse()?;
        let connection = match self
            .connection_string
            .as_deref()
            .filter(|s| !s.trim().is_empty())
        {
            Some(target) => ConnectionConfig::ConnectionString(target.to_string()),
            None => ConnectionConfig::Parameters(self.parameters.clone()),
        };
        Ok((provider, connection))
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;
    let config: Config = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))?;
    Ok(config)
}

/// Guess the provider of a bare connection URL from its scheme
pub fn provider_from_url(connection_string: &str) -> anyhow::Result<DatabaseProvider> {
    let scheme = connection_string
        .split_once("://")
        .map(|(scheme, _)| scheme)
        .ok_or_else(|| anyhow::anyhow!("Connection string has no URL scheme"))?;
    Ok(scheme.parse()?)
}

fn get_api_key(config: &Config, provider: &str) -> anyhow::Result<String> {
    let lower = format!("{}_api_key", provider);
    let upper = lower.to_uppercase();
    config
        .api_keys
        .get(&lower)
        .and_then(|v| v.as_str())
        .or_else(|| config.api_keys.get(&upper).and_then(|v| v.as_str()))
        .map(|s| s.to_string())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "{} API key not found in config. Expected '{}' or '{}' under [api_keys]",
                provider,
                lower,
                upper
            )
        })
}

/// Build the model client described by `[llm]`; defaults to OpenAI
pub fn create_llm_client(config: &Config) -> anyhow::Result<Arc<dyn LlmClient>> {
    let provider = config
        .llm
        .provider
        .as_deref()
        .unwrap_or(providers::OPENAI)
        .to_lowercase();

    let client: Arc<dyn LlmClient> = match provider.as_str() {
        providers::OPENAI => {
            let mut client = OpenAIClient::new(get_api_key(config, providers::OPENAI)?)?;
            if let Some(base_url) = &config.llm.base_url {
                client = client.with_base_url(base_url);
            }
            if let Some(model) = &config.llm.model {
                client = client.with_model(model);
            }
            Arc::new(client)
        }
        providers::ANTHROPIC => {
            let mut client = ClaudeClient::new(get_api_key(config, providers::ANTHROPIC)?)?;
            if let Some(base_url) = &config.llm.base_url {
                client = client.with_base_url(base_url);
            }
            if let Some(model) = &config.llm.model {
                client = client.with_model(model);
            }
            Arc::new(client)
        }
        providers::OLLAMA => {
            let mut client = OllamaClient::new()?;
            if let Some(base_url) = &config.llm.base_url {
                client = client.with_base_url(base_url);
            }
            if let Some(model) = &config.llm.model {
                client = client.with_model(model);
            }
            Arc::new(client)
        }
        other => {
            return Err(anyhow::anyhow!(
                "Unsupported LLM provider '{}'. Expected one of: {}, {}, {}",
                other,
                providers::OPENAI,
                providers::ANTHROPIC,
                providers::OLLAMA
            ))
        }
    };

    Ok(client)
}

pub fn agent_settings(config: &Config) -> AgentSettings {
    let defaults = AgentSettings::default();
    AgentSettings {
        persona: config
            .agent
            .persona
            .clone()
            .unwrap_or_else(|| DEFAULT_PERSONA.to_string()),
        routing: config.agent.models.clone(),
        max_result_rows: config.agent.max_result_rows.or(defaults.max_result_rows),
        temperatures: config.agent.temperatures.clone(),
    }
}
