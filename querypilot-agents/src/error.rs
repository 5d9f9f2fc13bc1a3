use crate::json_extract::JsonExtractError;
use querypilot_llm_sdk::error::LlmError;
use querypilot_tools::{DbError, SqlViolation};

/// Failure of a pipeline operation
///
/// Every stage failure aborts the current call; nothing is retried and no
/// partial answer is returned alongside an error.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Incomplete or invalid connection settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Database connection or schema introspection failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// `chat` or `get_schema` was called before a successful `connect`
    #[error("Not connected: call connect() before chat()")]
    NotConnected,

    /// Model output could not be reduced to the expected structured data
    #[error("Could not parse model response: {0}")]
    ResponseParse(String),

    /// Generated SQL was rejected by the SQL guard
    #[error("Generated SQL rejected: {0}")]
    SqlSafetyViolation(#[from] SqlViolation),

    /// The database rejected or failed the validated statement
    #[error("Query execution failed: {0}")]
    Execution(String),

    /// The model service could not be reached or returned an error
    #[error("Model request failed: {0}")]
    Model(#[from] LlmError),
}

impl AgentError {
    /// Failures while opening a connection or introspecting its schema
    pub(crate) fn connection_failure(err: DbError) -> Self {
        match err {
            DbError::Configuration(message) | DbError::UnsupportedProvider(message) => {
                AgentError::Configuration(message)
            }
            DbError::Connection(message) | DbError::Execution(message) => {
                AgentError::Connection(message)
            }
        }
    }
}

impl From<DbError> for AgentError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Configuration(message) => AgentError::Configuration(message),
            DbError::UnsupportedProvider(provider) => {
                AgentError::Configuration(format!("Unsupported database provider: {}", provider))
            }
            DbError::Connection(message) => AgentError::Connection(message),
            DbError::Execution(message) => AgentError::Execution(message),
        }
    }
}

impl From<JsonExtractError> for AgentError {
    fn from(err: JsonExtractError) -> Self {
        AgentError::ResponseParse(err.to_string())
    }
}
