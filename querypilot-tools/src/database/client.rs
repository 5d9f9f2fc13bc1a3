use super::DatabaseProvider;
use crate::db_error::DbError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// A result row: column name to normalized JSON value, in select order
pub type Row = Map<String, Value>;

/// An open, read-only database connection
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Dialect of the connected database
    fn provider(&self) -> DatabaseProvider;

    /// Password-free identity of the connection target
    fn identity(&self) -> &str;

    /// Run `sql` inside a read-only transaction and return every row
    async fn fetch_rows(&self, sql: &str) -> Result<Vec<Row>, DbError>;

    /// Release pooled connections
    async fn close(&self) {}
}

/// Opens [`DatabaseClient`]s from a resolved connection string
#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    async fn connect(
        &self,
        provider: DatabaseProvider,
        connection_string: &str,
    ) -> Result<Arc<dyn DatabaseClient>, DbError>;
}
