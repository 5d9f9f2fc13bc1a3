use super::client::{DatabaseClient, Row};
use crate::db_error::DbError;
use crate::sql_guard::ValidatedSql;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Rows returned by one validated statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub row_count: usize,
    pub truncated: bool,
    pub execution_time_ms: u64,
}

impl QueryResultSet {
    /// JSON form embedded into the analytical prompt
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "columns": self.columns,
            "rows": self.rows,
            "row_count": self.row_count,
            "truncated": self.truncated,
        })
    }
}

/// Runs [`ValidatedSql`] against a [`DatabaseClient`]
pub struct QueryExecutor {
    client: Arc<dyn DatabaseClient>,
    max_rows: Option<usize>,
}

impl QueryExecutor {
    /// `max_rows` caps the rows kept in the result; `None` keeps everything
    pub fn new(client: Arc<dyn DatabaseClient>, max_rows: Option<usize>) -> Self {
        Self { client, max_rows }
    }

    /// Executes the statement exactly as validated
    pub async fn execute(&self, sql: ValidatedSql) -> Result<QueryResultSet, DbError> {
        let start_time = Instant::now();

        let mut rows = self.client.fetch_rows(sql.as_str()).await?;

        let columns: Vec<String> = rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();

        let truncated = match self.max_rows {
            Some(limit) if rows.len() > limit => {
                rows.truncate(limit);
                true
            }
            _ => false,
        };

        let execution_time_ms = start_time.elapsed().as_millis() as u64;

        tracing::debug!(
            database = %self.client.identity(),
            row_count = rows.len(),
            truncated,
            execution_time_ms,
            "Query executed"
        );

        Ok(QueryResultSet {
            columns,
            row_count: rows.len(),
            rows,
            truncated,
            execution_time_ms,
        })
    }
}
