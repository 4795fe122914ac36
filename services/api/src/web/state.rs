//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::{
    adapters::{InMemoryResultRepository, RandomRankingProvider, StaticCatalog},
    config::Config,
    error::ApiError,
    web::envelope::ErrorReply,
};
use essay_scoring_core::{
    ports::{EssayScorer, RankingProvider, TestCatalog},
    FallbackScorer, ResultStore,
};
use std::{sync::Arc, time::Instant};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn TestCatalog>,
    pub results: ResultStore,
    pub fallback_scorer: Arc<dyn EssayScorer>,
    /// `None` when no API key is configured. Every submission is then scored by the fallback.
    pub ai_scorer: Option<Arc<dyn EssayScorer>>,
    pub rankings: Arc<dyn RankingProvider>,
    pub config: Arc<Config>,
    pub started_at: Instant,
}

impl AppState {
    /// Builds a state backed by the built-in catalog, an in-memory result map and
    /// randomly generated rankings.
    pub fn in_memory(config: Arc<Config>, ai_scorer: Option<Arc<dyn EssayScorer>>) -> Self {
        Self {
            catalog: Arc::new(StaticCatalog::builtin()),
            results: ResultStore::new(Arc::new(InMemoryResultRepository::new()), config.result_ttl),
            fallback_scorer: Arc::new(FallbackScorer),
            ai_scorer,
            rankings: Arc::new(RandomRankingProvider::default()),
            config,
            started_at: Instant::now(),
        }
    }

    /// Renders `err` for the client according to the configured environment.
    pub fn reject(&self, err: impl Into<ApiError>) -> ErrorReply {
        ErrorReply::from_error(err.into(), self.config.environment)
    }
}
