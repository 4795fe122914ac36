//! services/api/src/web/dto.rs
//!
//! JSON payloads of the REST API. Field names are camelCase on the wire.
//! Each response struct is built from its pure domain counterpart.

use chrono::{DateTime, Utc};
use essay_scoring_core::{
    domain::{
        AnswerRecord, EssayTest, Feedback, Question, QuestionScore, RankingEntry, ScoreBreakdown,
        ScoredResult, ScoringCriteria, TargetRanking,
    },
    ranking::{format_rank_change, format_score_change},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

//=========================================================================================
// Essay Tests
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDto {
    pub title: String,
    pub description: String,
    pub points: u32,
    pub character_limit: String,
}

impl From<Question> for QuestionDto {
    fn from(q: Question) -> Self {
        Self {
            title: q.title,
            description: q.description,
            points: q.points,
            character_limit: q.character_limit,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoringCriteriaDto {
    pub main_thesis: String,
    pub key_points: Vec<String>,
    pub question2_topic: String,
}

impl From<ScoringCriteria> for ScoringCriteriaDto {
    fn from(c: ScoringCriteria) -> Self {
        Self {
            main_thesis: c.main_thesis,
            key_points: c.key_points,
            question2_topic: c.question2_topic,
        }
    }
}

/// A full essay test, including the passage and both questions.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EssayTestDto {
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
    pub question1: QuestionDto,
    pub question2: QuestionDto,
    pub scoring_criteria: ScoringCriteriaDto,
}

impl From<EssayTest> for EssayTestDto {
    fn from(t: EssayTest) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            reading_time: t.reading_time,
            writing_time: t.writing_time,
            total_points: t.total_points,
            difficulty: t.difficulty,
            category: t.category,
            participants: t.participants,
            essay_text: t.essay_text,
            question1: t.question1.into(),
            question2: t.question2.into(),
            scoring_criteria: t.scoring_criteria.into(),
        }
    }
}

/// The list view of an essay test.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EssayTestSummaryDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub reading_time: String,
    pub writing_time: String,
    pub total_points: u32,
    pub difficulty: String,
    pub category: String,
    pub participants: u32,
}

impl From<EssayTest> for EssayTestSummaryDto {
    fn from(t: EssayTest) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            reading_time: t.reading_time,
            writing_time: t.writing_time,
            total_points: t.total_points,
            difficulty: t.difficulty,
            category: t.category,
            participants: t.participants,
        }
    }
}

//=========================================================================================
// Scores
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct CriterionScoreDto {
    pub score: u32,
    pub comment: String,
    pub reasoning: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct QuestionScoreDto {
    pub total: u32,
    /// Criterion name to its share of the total, in the scorer's order.
    pub breakdown: IndexMap<String, CriterionScoreDto>,
}

impl From<QuestionScore> for QuestionScoreDto {
    fn from(q: QuestionScore) -> Self {
        Self {
            total: q.total,
            breakdown: q
                .criteria
                .into_iter()
                .map(|c| {
                    (
                        c.name,
                        CriterionScoreDto {
                            score: c.score,
                            comment: c.comment,
                            reasoning: c.reasoning,
                        },
                    )
                })
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct FeedbackDto {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub overall_assessment: String,
}

impl From<Feedback> for FeedbackDto {
    fn from(f: Feedback) -> Self {
        Self {
            strengths: f.strengths,
            improvements: f.improvements,
            overall_assessment: f.overall_assessment,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ScoreBreakdownDto {
    pub question1: QuestionScoreDto,
    pub question2: QuestionScoreDto,
    pub feedback: FeedbackDto,
}

impl From<ScoreBreakdown> for ScoreBreakdownDto {
    fn from(s: ScoreBreakdown) -> Self {
        Self {
            question1: s.question1.into(),
            question2: s.question2.into(),
            feedback: s.feedback.into(),
        }
    }
}

//=========================================================================================
// Submissions and Results
//=========================================================================================

/// The body of `POST /api/scoring/submit`. Fields are optional so that a missing
/// field is reported in the usual envelope instead of a deserialization error.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub test_id: Option<String>,
    pub answer1: Option<String>,
    pub answer2: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub result_id: String,
    pub total_score: u32,
    pub scores: ScoreBreakdownDto,
    pub message: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct AnswerDto {
    pub text: String,
    pub length: usize,
}

impl From<AnswerRecord> for AnswerDto {
    fn from(a: AnswerRecord) -> Self {
        Self {
            text: a.text,
            length: a.length,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct AnswersDto {
    pub question1: AnswerDto,
    pub question2: AnswerDto,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultDebugDto {
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub server_time: DateTime<Utc>,
    pub used_fallback: bool,
    pub scoring_method: String,
}

/// A stored result as returned by `GET /api/results/{id}`.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultDto {
    pub id: String,
    pub test_id: String,
    pub test_title: String,
    pub total_score: u32,
    pub scores: ScoreBreakdownDto,
    pub submitted_at: DateTime<Utc>,
    /// Unix epoch milliseconds.
    pub expires_at: i64,
    pub answer1: String,
    pub answer2: String,
    pub answers: AnswersDto,
    pub debug: ResultDebugDto,
}

impl From<ScoredResult> for ResultDto {
    fn from(r: ScoredResult) -> Self {
        Self {
            id: r.id,
            test_id: r.test_id,
            test_title: r.test_title,
            total_score: r.total_score,
            scores: r.scores.into(),
            submitted_at: r.submitted_at,
            expires_at: r.expires_at.timestamp_millis(),
            answer1: r.answer1.text.clone(),
            answer2: r.answer2.text.clone(),
            answers: AnswersDto {
                question1: r.answer1.into(),
                question2: r.answer2.into(),
            },
            debug: ResultDebugDto {
                created_at: r.debug.created_at,
                expires_at: r.debug.expires_at,
                server_time: r.debug.server_time,
                used_fallback: r.debug.used_fallback,
                scoring_method: r.debug.scoring_method.as_str().to_string(),
            },
        }
    }
}

//=========================================================================================
// Rankings
//=========================================================================================

#[derive(Deserialize, IntoParams, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RankingQuery {
    /// `target` or `national`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Required when `type=target`.
    pub university_id: Option<String>,
    pub user_id: Option<String>,
}

/// Body of `POST /api/ranking`. Both fields are checked by the handler so that
/// a wrong shape answers with a specific message instead of a decode error.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SaveTargetsRequest {
    pub user_id: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub target_universities: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveTargetsResponse {
    pub target_universities: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntryDto {
    pub user_id: String,
    pub nickname: String,
    pub total_score: u32,
    pub test_count: u32,
    pub average_score: u32,
    pub rank: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_change: Option<i32>,
    pub last_test_date: DateTime<Utc>,
    /// Display form of `scoreChange`, e.g. `+3 pts`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_change_label: Option<String>,
    /// Display form of the move from `previousRank`, e.g. `up 2`. Empty without history.
    #[serde(default)]
    pub rank_change_label: String,
}

impl From<RankingEntry> for RankingEntryDto {
    fn from(e: RankingEntry) -> Self {
        Self {
            user_id: e.user_id,
            nickname: e.nickname,
            total_score: e.total_score,
            test_count: e.test_count,
            average_score: e.average_score,
            rank: e.rank,
            previous_rank: e.previous_rank,
            score_change: e.score_change,
            last_test_date: e.last_test_date,
            score_change_label: e.score_change.map(format_score_change),
            rank_change_label: format_rank_change(e.rank, e.previous_rank),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TargetRankingDto {
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
    pub entries: Vec<RankingEntryDto>,
}

impl From<TargetRanking> for TargetRankingDto {
    fn from(t: TargetRanking) -> Self {
        Self {
            university_id: t.university_id,
            university_name: t.university_name,
            my_rank: t.my_rank,
            total_participants: t.total_participants,
            my_score: t.my_score,
            top_score: t.top_score,
            average_score: t.average_score,
            points_to_next: t.points_to_next,
            points_to_top10: t.points_to_top10,
            points_to_top: t.points_to_top,
            entries: t.entries.into_iter().map(Into::into).collect(),
        }
    }
}

//=========================================================================================
// Health
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the server started.
    pub uptime: f64,
    pub environment: String,
}
