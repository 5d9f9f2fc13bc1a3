use serde::Deserialize;

pub const DEFAULT_PERSONA: &str = "You are a friendly senior data analyst. You answer questions \
about the user's business using the data in their database and explain results in plain language.";

pub const DEFAULT_MAX_RESULT_ROWS: usize = 200;

/// Optional per-stage model overrides; `None` uses the client's default model
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModelRouting {
    pub classification: Option<String>,
    pub sql_generation: Option<String>,
    pub synthesis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StageTemperatures {
    pub classification: f32,
    pub sql_generation: f32,
    pub synthesis: f32,
}

impl Default for StageTemperatures {
    fn default() -> Self {
        Self {
            classification: 0.0,
            sql_generation: 0.0,
            synthesis: 0.7,
        }
    }
}

/// Behaviour of a [`DatabaseChatAgent`](crate::DatabaseChatAgent)
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    /// Default persona, overridable per call
    pub persona: String,
    pub routing: ModelRouting,
    /// Rows kept from a result before it reaches the model
    pub max_result_rows: Option<usize>,
    pub temperatures: StageTemperatures,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            persona: DEFAULT_PERSONA.to_string(),
            routing: ModelRouting::default(),
            max_result_rows: Some(DEFAULT_MAX_RESULT_ROWS),
            temperatures: StageTemperatures::default(),
        }
    }
}

impl AgentSettings {
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    pub fn with_routing(mut self, routing: ModelRouting) -> Self {
        self.routing = routing;
        self
    }

    pub fn with_max_result_rows(mut self, max_result_rows: Option<usize>) -> Self {
        self.max_result_rows = max_result_rows;
        self
    }
}
