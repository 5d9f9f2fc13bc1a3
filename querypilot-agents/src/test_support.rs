//! Mock collaborators shared by the unit tests.

use async_trait::async_trait;
use querypilot_llm_sdk::client::LlmClient;
use querypilot_llm_sdk::error::LlmError;
use querypilot_llm_sdk::types::{
    CompletionRequest, CompletionResponse, ContentBlock, Role, Usage,
};
use querypilot_tools::{DatabaseClient, DatabaseConnector, DatabaseProvider, DbError, Row};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Returns queued responses in order and records every request
pub struct ScriptedLlmClient {
    responses: Mutex<VecDeque<String>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlmClient {
    pub fn new(responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Text of the single user message of the n-th request
    pub fn prompt(&self, index: usize) -> String {
        self.requests.lock().unwrap()[index].messages[0].joined_text()
    }

    pub fn model(&self, index: usize) -> String {
        self.requests.lock().unwrap()[index].model.clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        let text = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::internal("no scripted response left"))?;

        Ok(CompletionResponse {
            content: vec![ContentBlock::Text { text }],
            role: Role::Assistant,
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
            },
            stop_reason: Some("end_turn".to_string()),
        })
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => panic!("row must be an object"),
    }
}

/// In-memory database with a `users` table
pub struct MockDatabase {
    provider: DatabaseProvider,
    identity: String,
    data_rows: Vec<Row>,
    fail_introspection: bool,
    pub introspections: AtomicUsize,
    pub data_queries: Mutex<Vec<String>>,
    pub closed: AtomicUsize,
}

impl MockDatabase {
    pub fn new(provider: DatabaseProvider) -> Self {
        Self {
            provider,
            identity: format!("{}://localhost:5432/app", provider),
            data_rows: vec![row(json!({"total": "42"}))],
            fail_introspection: false,
            introspections: AtomicUsize::new(0),
            data_queries: Mutex::new(Vec::new()),
            closed: AtomicUsize::new(0),
        }
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.data_rows = rows;
        self
    }

    pub fn failing_introspection(mut self) -> Self {
        self.fail_introspection = true;
        self
    }

    pub fn introspection_count(&self) -> usize {
        self.introspections.load(Ordering::SeqCst)
    }

    pub fn executed(&self) -> Vec<String> {
        self.data_queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabase {
    fn provider(&self) -> DatabaseProvider {
        self.provider
    }

    fn identity(&self) -> &str {
        &self.identity
    }

    async fn fetch_rows(&self, sql: &str) -> Result<Vec<Row>, DbError> {
        if sql.contains("information_schema.") || sql.contains("pg_catalog.") {
            if sql.contains("information_schema.tables") {
                self.introspections.fetch_add(1, Ordering::SeqCst);
                if self.fail_introspection {
                    return Err(DbError::Execution("permission denied for schema".into()));
                }
                return Ok(vec![row(json!({"table_name": "users"}))]);
            }
            let columns_query =
                sql.contains("information_schema.columns") || sql.contains("format_type(");
            if columns_query {
                return Ok(vec![
                    row(json!({"table_name": "users", "column_name": "id", "data_type": "bigint", "is_nullable": "NO", "ordinal_position": 1})),
                    row(json!({"table_name": "users", "column_name": "created_at", "data_type": "timestamp with time zone", "is_nullable": "NO", "ordinal_position": 2})),
                ]);
            }
            return Ok(Vec::new());
        }

        self.data_queries.lock().unwrap().push(sql.to_string());
        Ok(self.data_rows.clone())
    }

    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Hands out a shared [`MockDatabase`] and records connection targets
pub struct MockConnector {
    pub database: Arc<MockDatabase>,
    pub targets: Mutex<Vec<String>>,
    fail: bool,
}

impl MockConnector {
    pub fn new(database: MockDatabase) -> Arc<Self> {
        Arc::new(Self {
            database: Arc::new(database),
            targets: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            database: Arc::new(MockDatabase::new(DatabaseProvider::Postgresql)),
            targets: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn connect_count(&self) -> usize {
        self.targets.lock().unwrap().len()
    }
}

#[async_trait]
impl DatabaseConnector for MockConnector {
    async fn connect(
        &self,
        _provider: DatabaseProvider,
        connection_string: &str,
    ) -> Result<Arc<dyn DatabaseClient>, DbError> {
        self.targets
            .lock()
            .unwrap()
            .push(connection_string.to_string());
        if self.fail {
            return Err(DbError::Connection("connection refused".into()));
        }
        Ok(self.database.clone())
    }
}
