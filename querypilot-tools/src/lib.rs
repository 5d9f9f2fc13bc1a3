//! Database plumbing for the querypilot pipeline.
//!
//! - [`database`]: providers, connection resolution, the [`DatabaseClient`]
//!   abstraction and its `sqlx` implementation, and the [`QueryExecutor`].
//! - [`schema`]: catalog introspection and deterministic rendering.
//! - [`sql_guard`]: the validator that turns model output into a [`ValidatedSql`].

pub mod database;
pub mod db_error;
pub mod schema;
pub mod sql_guard;

pub use database::{
    ConnectionConfig, ConnectionParameters, DatabaseClient, DatabaseConnector, DatabaseProvider,
    QueryExecutor, QueryResultSet, Row, SqlxConnector, SqlxDatabase, SqlxSettings,
};
pub use db_error::DbError;
pub use schema::{
    ColumnDescription, ForeignKeyDescription, KeyRole, SchemaDescription, TableDescription,
};
pub use sql_guard::{validate_sql, SqlViolation, ValidatedSql};
