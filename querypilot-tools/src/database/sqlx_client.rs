//! `sqlx`-backed [`DatabaseClient`] for PostgreSQL and MySQL.
//!
//! Every call runs inside a read-only transaction with a statement timeout and
//! is rolled back afterwards, so even a statement that slipped past the SQL
//! guard cannot change data.

use super::client::{DatabaseClient, DatabaseConnector, Row};
use super::values::{mysql_rows_to_json, pg_rows_to_json};
use super::{connection_identity, validate_connection_string, DatabaseProvider};
use crate::db_error::DbError;
use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Connection, Executor};
use std::sync::Arc;
use std::time::Duration;

/// Pool and timeout settings
#[derive(Debug, Clone)]
pub struct SqlxSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub statement_timeout: Duration,
}

impl Default for SqlxSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
            statement_timeout: Duration::from_secs(30),
        }
    }
}

enum Pool {
    Postgres(PgPool),
    Mysql(MySqlPool),
}

pub struct SqlxDatabase {
    pool: Pool,
    identity: String,
    statement_timeout: Duration,
}

impl SqlxDatabase {
    /// Opens a connection pool and verifies the server is reachable
    pub async fn connect(
        provider: DatabaseProvider,
        connection_string: &str,
        settings: &SqlxSettings,
    ) -> Result<Self, DbError> {
        validate_connection_string(provider, connection_string)?;
        let identity = connection_identity(connection_string);

        tracing::info!(provider = %provider, database = %identity, "Connecting to database");

        let pool = match provider {
            DatabaseProvider::Postgresql => Pool::Postgres(
                PgPoolOptions::new()
                    .max_connections(settings.max_connections)
                    .acquire_timeout(settings.acquire_timeout)
                    .connect(connection_string)
                    .await
                    .map_err(|e| {
                        DbError::Connection(format!("Failed to connect to PostgreSQL: {}", e))
                    })?,
            ),
            DatabaseProvider::Mysql => Pool::Mysql(
                MySqlPoolOptions::new()
                    .max_connections(settings.max_connections)
                    .acquire_timeout(settings.acquire_timeout)
                    .connect(connection_string)
                    .await
                    .map_err(|e| {
                        DbError::Connection(format!("Failed to connect to MySQL: {}", e))
                    })?,
            ),
        };

        Ok(Self {
            pool,
            identity,
            statement_timeout: settings.statement_timeout,
        })
    }

    fn timeout_ms(&self) -> u128 {
        self.statement_timeout.as_millis().max(1)
    }

    async fn fetch_postgres(&self, pool: &PgPool, sql: &str) -> Result<Vec<Row>, DbError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| DbError::Connection(format!("Failed to begin transaction: {}", e)))?;

        (&mut *tx)
            .execute("SET TRANSACTION READ ONLY")
            .await
            .map_err(|e| DbError::Execution(format!("Failed to set read-only mode: {}", e)))?;

        (&mut *tx)
            .execute(format!("SET LOCAL statement_timeout = {}", self.timeout_ms()).as_str())
            .await
            .map_err(|e| DbError::Execution(format!("Failed to set timeout: {}", e)))?;

        let rows: Vec<PgRow> = sqlx::query(sql)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| DbError::Execution(format!("Query execution failed: {}", e)))?;

        tx.rollback()
            .await
            .map_err(|e| DbError::Execution(format!("Failed to rollback transaction: {}", e)))?;

        Ok(pg_rows_to_json(&rows))
    }

    async fn fetch_mysql(&self, pool: &MySqlPool, sql: &str) -> Result<Vec<Row>, DbError> {
        let mut conn = pool
            .acquire()
            .await
            .map_err(|e| DbError::Connection(format!("Failed to acquire connection: {}", e)))?;

        (&mut *conn)
            .execute(format!("SET SESSION max_execution_time = {}", self.timeout_ms()).as_str())
            .await
            .map_err(|e| DbError::Execution(format!("Failed to set timeout: {}", e)))?;

        // Applies to the next transaction only
        (&mut *conn)
            .execute("SET TRANSACTION READ ONLY")
            .await
            .map_err(|e| DbError::Execution(format!("Failed to set read-only mode: {}", e)))?;

        let mut tx = conn
            .begin()
            .await
            .map_err(|e| DbError::Connection(format!("Failed to begin transaction: {}", e)))?;

        let rows: Vec<MySqlRow> = sqlx::query(sql)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| DbError::Execution(format!("Query execution failed: {}", e)))?;

        tx.rollback()
            .await
            .map_err(|e| DbError::Execution(format!("Failed to rollback transaction: {}", e)))?;

        Ok(mysql_rows_to_json(&rows))
    }
}

#[async_trait]
impl DatabaseClient for SqlxDatabase {
    fn provider(&self) -> DatabaseProvider {
        match self.pool {
            Pool::Postgres(_) => DatabaseProvider::Postgresql,
            Pool::Mysql(_) => DatabaseProvider::Mysql,
        }
    }

    fn identity(&self) -> &str {
        &self.identity
    }

    async fn fetch_rows(&self, sql: &str) -> Result<Vec<Row>, DbError> {
        match &self.pool {
            Pool::Postgres(pool) => self.fetch_postgres(pool, sql).await,
            Pool::Mysql(pool) => self.fetch_mysql(pool, sql).await,
        }
    }

    async fn close(&self) {
        tracing::info!(database = %self.identity, "Closing database pool");
        match &self.pool {
            Pool::Postgres(pool) => pool.close().await,
            Pool::Mysql(pool) => pool.close().await,
        }
    }
}

/// Production [`DatabaseConnector`] opening [`SqlxDatabase`] pools
#[derive(Debug, Clone, Default)]
pub struct SqlxConnector {
    settings: SqlxSettings,
}

impl SqlxConnector {
    pub fn new(settings: SqlxSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl DatabaseConnector for SqlxConnector {
    async fn connect(
        &self,
        provider: DatabaseProvider,
        connection_string: &str,
    ) -> Result<Arc<dyn DatabaseClient>, DbError> {
        let database =
            SqlxDatabase::connect(provider, connection_string, &self.settings).await?;
        Ok(Arc::new(database))
    }
}
