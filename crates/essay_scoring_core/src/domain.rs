//! crates/essay_scoring_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage or serialization format.

use chrono::{DateTime, Utc};

//=========================================================================================
// Test Catalog
//=========================================================================================

/// One of the two questions attached to an essay test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub title: String,
    pub description: String,
    pub points: u32,
    /// Human-readable hint such as "about 200 characters".
    pub character_limit: String,
}

/// Reference material the graders (human or AI) use for a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringCriteria {
    pub main_thesis: String,
    pub key_points: Vec<String>,
    pub question2_topic: String,
}

/// A complete essay test: the passage to read and the two questions to answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EssayTest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub reading_time: String,
    pub writing_time: String,
    pub total_points: u32,
    pub difficulty: String,
    pub category: String,
    pub participants: u32,
    pub essay_text: String,
    pub question1: Question,
    pub question2: Question,
    pub scoring_criteria: ScoringCriteria,
}

//=========================================================================================
// Submissions and Scores
//=========================================================================================

/// The answers a user hands in for one test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub test_id: String,
    /// Summary answer (question 1).
    pub answer1: String,
    /// Opinion answer (question 2).
    pub answer2: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriterionScore {
    pub name: String,
    pub score: u32,
    pub comment: String,
    pub reasoning: String,
}

/// The total awarded for one question and how it splits across criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionScore {
    pub total: u32,
    pub criteria: Vec<CriterionScore>,
}

impl QuestionScore {
    /// Sum of the criterion sub-scores. May be below `total` because of flooring.
    pub fn criteria_sum(&self) -> u32 {
        self.criteria.iter().map(|c| c.score).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub overall_assessment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub question1: QuestionScore,
    pub question2: QuestionScore,
    pub feedback: Feedback,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.question1.total + self.question2.total
    }
}

/// Which scorer produced a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMethod {
    Fallback,
    Ai,
}

impl ScoringMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMethod::Fallback => "fallback",
            ScoringMethod::Ai => "ai",
        }
    }
}

//=========================================================================================
// Stored Results
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub text: String,
    /// Length in characters.
    pub length: usize,
}

impl AnswerRecord {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            length: text.chars().count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultDebug {
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub server_time: DateTime<Utc>,
    pub used_fallback: bool,
    pub scoring_method: ScoringMethod,
}

/// A scored submission as held by the result store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredResult {
    pub id: String,
    pub test_id: String,
    pub test_title: String,
    pub total_score: u32,
    pub scores: ScoreBreakdown,
    pub submitted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub answer1: AnswerRecord,
    pub answer2: AnswerRecord,
    pub debug: ResultDebug,
}

impl ScoredResult {
    /// Assembles a result created at `now` that lives for `ttl`.
    pub fn new(
        id: String,
        test: &EssayTest,
        submission: &Submission,
        scores: ScoreBreakdown,
        method: ScoringMethod,
        now: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Self {
        let expires_at = now + ttl;
        Self {
            id,
            test_id: test.id.clone(),
            test_title: test.title.clone(),
            total_score: scores.total(),
            scores,
            submitted_at: now,
            expires_at,
            answer1: AnswerRecord::new(&submission.answer1),
            answer2: AnswerRecord::new(&submission.answer2),
            debug: ResultDebug {
                created_at: now,
                expires_at,
                server_time: now,
                used_fallback: method == ScoringMethod::Fallback,
                scoring_method: method,
            },
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

//=========================================================================================
// Rankings
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniversityCategory {
    National,
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct University {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub category: UniversityCategory,
    /// Tier from "S" (hardest) down to "C".
    pub difficulty: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingEntry {
    pub user_id: String,
    pub nickname: String,
    pub total_score: u32,
    pub test_count: u32,
    pub average_score: u32,
    pub rank: u32,
    pub previous_rank: Option<u32>,
    pub score_change: Option<i32>,
    pub last_test_date: DateTime<Utc>,
}

/// A user's standing among everyone aiming for the same university.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRanking {
    pub university_id: String,
    pub university_name: String,
    pub my_rank: u32,
    pub total_participants: u32,
    pub my_score: u32,
    pub top_score: u32,
    pub average_score: u32,
    pub points_to_next: u32,
    pub points_to_top10: u32,
    pub points_to_top: u32,
    pub entries: Vec<RankingEntry>,
}
