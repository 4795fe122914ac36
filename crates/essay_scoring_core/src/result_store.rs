//! crates/essay_scoring_core/src/result_store.rs
//!
//! Result lifecycle on top of a `ResultRepository`: id generation, saving,
//! and lazy expiry on read.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::domain::ScoredResult;
use crate::ports::{PortError, PortResult, ResultRepository};

/// How long a result stays readable after it is created.
pub const DEFAULT_RESULT_TTL_DAYS: i64 = 30;

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Builds an id of the form `result_<unix millis>_<9 base-36 chars>`.
pub fn generate_result_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("result_{}_{}", now.timestamp_millis(), suffix)
}

/// Owns every stored result. Expired entries are evicted the first time they are read.
#[derive(Clone)]
pub struct ResultStore {
    repository: Arc<dyn ResultRepository>,
    ttl: Duration,
}

impl ResultStore {
    pub fn new(repository: Arc<dyn ResultRepository>, ttl: Duration) -> Self {
        Self { repository, ttl }
    }

    pub fn with_default_ttl(repository: Arc<dyn ResultRepository>) -> Self {
        Self::new(repository, Duration::days(DEFAULT_RESULT_TTL_DAYS))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stores `result` under `id`, replacing anything already there.
    pub async fn save(&self, id: &str, result: ScoredResult) -> PortResult<()> {
        self.repository.set(id, result).await
    }

    pub async fn get(&self, id: &str) -> PortResult<ScoredResult> {
        self.get_at(id, Utc::now()).await
    }

    /// Looks up `id` as of `now`.
    ///
    /// Returns `PortError::Gone` the first time an expired result is read and
    /// deletes it, so any later read returns `PortError::NotFound`. A result saved
    /// under the same id between the read and the delete survives.
    pub async fn get_at(&self, id: &str, now: DateTime<Utc>) -> PortResult<ScoredResult> {
        let result = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Result {} not found", id)))?;

        if result.is_expired_at(now) {
            self.repository.remove_if_expired(id, now).await?;
            return Err(PortError::Gone(format!("Result {} has expired", id)));
        }

        Ok(result)
    }

    /// Every stored result, oldest first. Expired entries that were never read are included.
    pub async fn list(&self) -> PortResult<Vec<ScoredResult>> {
        let mut results = self.repository.list().await?;
        results.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        Ok(results)
    }
}
