//! services/api/src/adapters/memory.rs
//!
//! The process-local implementation of the `ResultRepository` port.
//! Everything stored here is lost when the server restarts.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use essay_scoring_core::{
    domain::ScoredResult,
    ports::{PortResult, ResultRepository},
};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryResultRepository {
    results: RwLock<HashMap<String, ScoredResult>>,
}

impl InMemoryResultRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultRepository for InMemoryResultRepository {
    async fn get(&self, id: &str) -> PortResult<Option<ScoredResult>> {
        Ok(self.results.read().await.get(id).cloned())
    }

    async fn set(&self, id: &str, result: ScoredResult) -> PortResult<()> {
        self.results.write().await.insert(id.to_string(), result);
        Ok(())
    }

    async fn remove_if_expired(&self, id: &str, now: DateTime<Utc>) -> PortResult<bool> {
        let mut results = self.results.write().await;
        if results.get(id).is_some_and(|r| r.is_expired_at(now)) {
            results.remove(id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn list(&self) -> PortResult<Vec<ScoredResult>> {
        Ok(self.results.read().await.values().cloned().collect())
    }
}
