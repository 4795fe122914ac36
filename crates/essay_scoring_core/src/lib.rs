pub mod domain;
pub mod ports;
pub mod ranking;
pub mod result_store;
pub mod scoring;
pub mod session;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_support;

pub use domain::{
    AnswerRecord, CriterionScore, EssayTest, Feedback, Question, QuestionScore, RankingEntry,
    ResultDebug, ScoreBreakdown, ScoredResult, ScoringCriteria, ScoringMethod, Submission,
    TargetRanking, University, UniversityCategory,
};
pub use ports::{
    EssayScorer, PortError, PortResult, RankingProvider, ResultRepository, TestCatalog,
};
pub use result_store::ResultStore;
pub use scoring::FallbackScorer;
pub use session::{SessionError, SessionPhase, TestSession, TickOutcome};
pub use validator::{validate_submission, ValidationError};
