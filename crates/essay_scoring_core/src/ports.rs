//! crates/essay_scoring_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific implementations like storage or LLM APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::domain::{EssayTest, RankingEntry, ScoreBreakdown, ScoredResult, Submission, TargetRanking};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The item existed but has expired and was evicted.
    #[error("Item has expired: {0}")]
    Gone(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait TestCatalog: Send + Sync {
    async fn list_tests(&self) -> PortResult<Vec<EssayTest>>;

    /// Returns `PortError::NotFound` for an unknown id.
    async fn get_test(&self, test_id: &str) -> PortResult<EssayTest>;
}

/// Key-value storage for scored results. Expiry is not this layer's concern.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    async fn get(&self, id: &str) -> PortResult<Option<ScoredResult>>;

    /// Inserts or overwrites the result stored under `id`.
    async fn set(&self, id: &str, result: ScoredResult) -> PortResult<()>;

    /// Removes the result under `id` only if the one stored now has expired at `now`.
    /// The check and the removal happen under one lock, so a result saved after an
    /// expired read is never deleted by it. Returns whether anything was removed.
    async fn remove_if_expired(&self, id: &str, now: DateTime<Utc>) -> PortResult<bool>;

    async fn list(&self) -> PortResult<Vec<ScoredResult>>;
}

#[async_trait]
pub trait EssayScorer: Send + Sync {
    /// Scores both answers of a submission against its test.
    async fn score(&self, test: &EssayTest, submission: &Submission) -> PortResult<ScoreBreakdown>;
}

#[async_trait]
pub trait RankingProvider: Send + Sync {
    async fn target_ranking(&self, university_id: &str, user_id: &str) -> PortResult<TargetRanking>;

    async fn national_ranking(&self, user_id: &str) -> PortResult<Vec<RankingEntry>>;

    /// Replaces the user's target universities and returns the stored list.
    /// Fails with `NotFound` on an unknown university id.
    async fn save_targets(&self, user_id: &str, university_ids: Vec<String>) -> PortResult<Vec<String>>;

    /// The user's saved target universities, empty if none were saved.
    async fn targets(&self, user_id: &str) -> PortResult<Vec<String>>;
}
