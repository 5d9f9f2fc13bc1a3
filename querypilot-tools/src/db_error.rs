/// Database access error
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Execution error: {0}")]
    Execution(String),
    #[error("Unsupported database provider: {0}")]
    UnsupportedProvider(String),
}
