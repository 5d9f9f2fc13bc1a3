//! Per-agent cache of the rendered schema text.
//!
//! Readers take an `Arc<str>` snapshot and never block on each other.
//! Refreshes are serialized by an async mutex, so at most one introspection
//! runs at a time and a reader never sees a half-built schema.

use querypilot_tools::schema::introspect;
use querypilot_tools::{DatabaseClient, DbError};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

struct CachedSchema {
    identity: String,
    text: Arc<str>,
}

#[derive(Default)]
pub struct SchemaCache {
    entry: RwLock<Option<CachedSchema>>,
    refresh: Mutex<()>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached text for a connection identity, if present
    pub async fn cached(&self, identity: &str) -> Option<Arc<str>> {
        self.entry
            .read()
            .await
            .as_ref()
            .filter(|entry| entry.identity == identity)
            .map(|entry| entry.text.clone())
    }

    /// Schema text for `client`, introspecting on a miss or when forced.
    ///
    /// On failure the entry is left unset so the next call retries.
    pub async fn get(
        &self,
        client: &dyn DatabaseClient,
        force_refresh: bool,
    ) -> Result<Arc<str>, DbError> {
        let identity = client.identity();

        if !force_refresh {
            if let Some(text) = self.cached(identity).await {
                return Ok(text);
            }
        }

        let _guard = self.refresh.lock().await;

        // Another caller may have filled the entry while we waited
        if !force_refresh {
            if let Some(text) = self.cached(identity).await {
                return Ok(text);
            }
        }

        match introspect(client).await {
            Ok(schema) => {
                let text: Arc<str> = Arc::from(schema.render(client.provider()));
                tracing::info!(
                    database = %identity,
                    tables = schema.tables.len(),
                    "Schema cache refreshed"
                );
                *self.entry.write().await = Some(CachedSchema {
                    identity: identity.to_string(),
                    text: text.clone(),
                });
                Ok(text)
            }
            Err(e) => {
                tracing::warn!(database = %identity, error = %e, "Schema introspection failed");
                *self.entry.write().await = None;
                Err(e)
            }
        }
    }

    pub async fn clear(&self) {
        let _guard = self.refresh.lock().await;
        *self.entry.write().await = None;
    }
}
