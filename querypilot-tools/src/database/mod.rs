//! Database providers, connection resolution and query execution.
//!
//! A connection target is either a ready-made connection string or the five
//! structured parameters `host`, `port`, `user`, `password` and `database`.
//! The structured form is all-or-nothing: a partial set is a configuration
//! error and nothing is filled in from defaults.

use crate::db_error::DbError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod client;
pub mod executor;
pub mod sqlx_client;
mod values;

pub use client::{DatabaseClient, DatabaseConnector, Row};
pub use executor::{QueryExecutor, QueryResultSet};
pub use sqlx_client::{SqlxConnector, SqlxDatabase, SqlxSettings};

/// SQL dialect of the connected database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseProvider {
    #[serde(alias = "postgres")]
    Postgresql,
    Mysql,
}

impl DatabaseProvider {
    /// Canonical provider name
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseProvider::Postgresql => "postgresql",
            DatabaseProvider::Mysql => "mysql",
        }
    }

    /// Human-readable dialect name used in prompts
    pub fn display_name(&self) -> &'static str {
        match self {
            DatabaseProvider::Postgresql => "PostgreSQL",
            DatabaseProvider::Mysql => "MySQL",
        }
    }

    /// Identifier quote character of the dialect
    pub fn identifier_quote(&self) -> char {
        match self {
            DatabaseProvider::Postgresql => '"',
            DatabaseProvider::Mysql => '`',
        }
    }

    /// Quote an identifier, doubling any embedded quote characters
    pub fn quote_identifier(&self, identifier: &str) -> String {
        let quote = self.identifier_quote();
        let escaped = identifier.replace(quote, &format!("{quote}{quote}"));
        format!("{quote}{escaped}{quote}")
    }

    /// URL schemes accepted for this provider; the first is used when assembling
    fn schemes(&self) -> &'static [&'static str] {
        match self {
            DatabaseProvider::Postgresql => &["postgresql", "postgres"],
            DatabaseProvider::Mysql => &["mysql"],
        }
    }
}

impl std::fmt::Display for DatabaseProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseProvider {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(DatabaseProvider::Postgresql),
            "mysql" => Ok(DatabaseProvider::Mysql),
            other => Err(DbError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Structured connection parameters
///
/// Fields are optional so that incomplete input can be reported precisely
/// instead of failing at deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParameters {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

/// Where to connect: a connection string or structured parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionConfig {
    ConnectionString(String),
    Parameters(ConnectionParameters),
}

impl From<String> for ConnectionConfig {
    fn from(value: String) -> Self {
        ConnectionConfig::ConnectionString(value)
    }
}

impl From<&str> for ConnectionConfig {
    fn from(value: &str) -> Self {
        ConnectionConfig::ConnectionString(value.to_string())
    }
}

impl From<ConnectionParameters> for ConnectionConfig {
    fn from(value: ConnectionParameters) -> Self {
        ConnectionConfig::Parameters(value)
    }
}

impl ConnectionConfig {
    /// Resolve into a connection URL for `provider`
    pub fn resolve(&self, provider: DatabaseProvider) -> Result<String, DbError> {
        match self {
            ConnectionConfig::ConnectionString(target) => {
                validate_connection_string(provider, target)?;
                Ok(target.clone())
            }
            ConnectionConfig::Parameters(params) => assemble_connection_string(provider, params),
        }
    }
}

fn assemble_connection_string(
    provider: DatabaseProvider,
    params: &ConnectionParameters,
) -> Result<String, DbError> {
    fn present(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|v| !v.trim().is_empty())
    }

    let host = present(&params.host);
    let user = present(&params.user);
    let password = present(&params.password);
    let database = present(&params.database);
    let port = params.port.filter(|p| *p != 0);

    let mut missing = Vec::new();
    if host.is_none() {
        missing.push("host");
    }
    if port.is_none() {
        missing.push("port");
    }
    if user.is_none() {
        missing.push("user");
    }
    if password.is_none() {
        missing.push("password");
    }
    if database.is_none() {
        missing.push("database");
    }

    let (Some(host), Some(port), Some(user), Some(password), Some(database)) =
        (host, port, user, password, database)
    else {
        return Err(DbError::Configuration(format!(
            "Incomplete connection parameters, missing: {}",
            missing.join(", ")
        )));
    };

    let scheme = provider.schemes()[0];
    let mut url = url::Url::parse(&format!("{}://{}:{}", scheme, host, port))
        .map_err(|e| DbError::Configuration(format!("Invalid host or port: {}", e)))?;
    url.set_username(user)
        .map_err(|_| DbError::Configuration("Invalid user name".to_string()))?;
    url.set_password(Some(password))
        .map_err(|_| DbError::Configuration("Invalid password".to_string()))?;
    url.set_path(&format!("/{}", database));

    Ok(url.to_string())
}

/// Validates a connection string against the provider's URL schemes
pub fn validate_connection_string(
    provider: DatabaseProvider,
    connection_string: &str,
) -> Result<(), DbError> {
    if connection_string.trim().is_empty() {
        return Err(DbError::Configuration(
            "Connection string cannot be empty".to_string(),
        ));
    }

    let url = url::Url::parse(connection_string)
        .map_err(|e| DbError::Configuration(format!("Invalid connection string format: {}", e)))?;

    if !provider.schemes().contains(&url.scheme()) {
        return Err(DbError::Configuration(format!(
            "Connection string for {} must start with {}",
            provider.display_name(),
            provider
                .schemes()
                .iter()
                .map(|s| format!("'{}://'", s))
                .collect::<Vec<_>>()
                .join(" or ")
        )));
    }

    if url.host_str().is_none() {
        return Err(DbError::Configuration(
            "Connection string must include a host".to_string(),
        ));
    }

    Ok(())
}

/// Password-free identity of a connection target, e.g. `postgresql://db.internal:5432/sales`
pub fn connection_identity(connection_string: &str) -> String {
    match url::Url::parse(connection_string) {
        Ok(url) => {
            let host = url.host_str().unwrap_or("localhost");
            let port = url
                .port()
                .map(|p| format!(":{}", p))
                .unwrap_or_default();
            format!("{}://{}{}{}", url.scheme(), host, port, url.path())
        }
        Err(_) => "<unparsed connection>".to_string(),
    }
}
