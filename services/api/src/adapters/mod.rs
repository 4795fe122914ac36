pub mod ai_scorer;
pub mod catalog;
pub mod memory;
pub mod ranking;

pub use ai_scorer::OpenAiScoringAdapter;
pub use catalog::StaticCatalog;
pub use memory::InMemoryResultRepository;
pub use ranking::RandomRankingProvider;
