//! services/api/src/web/scoring_task.rs
//!
//! The submission pipeline behind `POST /api/scoring/submit`: check the request,
//! score it, and store the result.

use crate::{error::ApiError, web::state::AppState};
use chrono::Utc;
use essay_scoring_core::{
    domain::{EssayTest, ScoreBreakdown, ScoredResult, ScoringMethod, Submission},
    result_store::generate_result_id,
    validate_submission,
};
use tracing::{info, warn};

pub const SCORING_COMPLETE_MESSAGE: &str = "Scoring complete";

/// Scores a submission and stores the result under a fresh id.
pub async fn process_submission(
    app_state: &AppState,
    test_id: Option<String>,
    answer1: Option<String>,
    answer2: Option<String>,
) -> Result<ScoredResult, ApiError> {
    let submission = match (present(test_id), present(answer1), present(answer2)) {
        (Some(test_id), Some(answer1), Some(answer2)) => Submission {
            test_id,
            answer1,
            answer2,
        },
        _ => {
            return Err(ApiError::Validation(
                "testId, answer1 and answer2 are required".to_string(),
            ))
        }
    };

    let test = app_state.catalog.get_test(&submission.test_id).await?;
    validate_submission(&submission.answer1, &submission.answer2)?;

    let (scores, method) = score_with_fallback(app_state, &test, &submission).await?;

    let now = Utc::now();
    let id = generate_result_id(now);
    let result = ScoredResult::new(
        id.clone(),
        &test,
        &submission,
        scores,
        method,
        now,
        app_state.results.ttl(),
    );
    app_state.results.save(&id, result.clone()).await?;

    info!(
        "Scored {} for test {}: {} points ({})",
        id,
        test.id,
        result.total_score,
        method.as_str()
    );
    Ok(result)
}

/// Tries the AI scorer within the configured timeout, then the heuristic scorer.
async fn score_with_fallback(
    app_state: &AppState,
    test: &EssayTest,
    submission: &Submission,
) -> Result<(ScoreBreakdown, ScoringMethod), ApiError> {
    if let Some(ai_scorer) = &app_state.ai_scorer {
        let timeout = app_state.config.ai_scoring_timeout;
        match tokio::time::timeout(timeout, ai_scorer.score(test, submission)).await {
            Ok(Ok(scores)) => return Ok((scores, ScoringMethod::Ai)),
            Ok(Err(e)) => warn!("AI scoring failed, using fallback: {}", e),
            Err(_) => warn!("AI scoring timed out after {:?}, using fallback", timeout),
        }
    }

    let scores = app_state.fallback_scorer.score(test, submission).await?;
    Ok((scores, ScoringMethod::Fallback))
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use async_trait::async_trait;
    use essay_scoring_core::{
        domain::{CriterionScore, Feedback, QuestionScore},
        ports::{EssayScorer, PortError, PortResult},
    };
    use std::{sync::Arc, time::Duration};

    struct FixedScorer;

    #[async_trait]
    impl EssayScorer for FixedScorer {
        async fn score(&self, _test: &EssayTest, _submission: &Submission) -> PortResult<ScoreBreakdown> {
            let question = |total| QuestionScore {
                total,
                criteria: vec![CriterionScore {
                    name: "Overall".to_string(),
                    score: total,
                    comment: String::new(),
                    reasoning: String::new(),
                }],
            };
            Ok(ScoreBreakdown {
                question1: question(28),
                question2: question(65),
                feedback: Feedback {
                    strengths: vec![],
                    improvements: vec![],
                    overall_assessment: "Excellent.".to_string(),
                },
            })
        }
    }

    struct FailingScorer;

    #[async_trait]
    impl EssayScorer for FailingScorer {
        async fn score(&self, _test: &EssayTest, _submission: &Submission) -> PortResult<ScoreBreakdown> {
            Err(PortError::Unexpected("rate limited".to_string()))
        }
    }

    struct SlowScorer;

    #[async_trait]
    impl EssayScorer for SlowScorer {
        async fn score(&self, test: &EssayTest, submission: &Submission) -> PortResult<ScoreBreakdown> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            FixedScorer.score(test, submission).await
        }
    }

    fn state(ai_scorer: Option<Arc<dyn EssayScorer>>) -> AppState {
        AppState::in_memory(Arc::new(Config::default()), ai_scorer)
    }

    fn answers() -> (Option<String>, Option<String>, Option<String>) {
        (
            Some("t1".to_string()),
            Some("A".repeat(200)),
            Some("B".repeat(700)),
        )
    }

    #[tokio::test]
    async fn fallback_scores_and_stores_the_result() {
        let app_state = state(None);
        let (test_id, answer1, answer2) = answers();

        let result = process_submission(&app_state, test_id, answer1, answer2)
            .await
            .unwrap();

        assert_eq!(result.total_score, 85);
        assert_eq!(result.scores.question1.total, 25);
        assert_eq!(result.scores.question2.total, 60);
        assert!(result.debug.used_fallback);
        assert!(result.id.starts_with("result_"));
        assert_eq!(result.answer2.length, 700);

        let stored = app_state.results.get(&result.id).await.unwrap();
        assert_eq!(stored, result);
    }

    #[tokio::test]
    async fn uses_the_ai_scorer_when_it_answers() {
        let app_state = state(Some(Arc::new(FixedScorer)));
        let (test_id, answer1, answer2) = answers();

        let result = process_submission(&app_state, test_id, answer1, answer2)
            .await
            .unwrap();

        assert_eq!(result.total_score, 93);
        assert_eq!(result.debug.scoring_method, ScoringMethod::Ai);
        assert!(!result.debug.used_fallback);
    }

    #[tokio::test]
    async fn ai_failure_falls_back() {
        let app_state = state(Some(Arc::new(FailingScorer)));
        let (test_id, answer1, answer2) = answers();

        let result = process_submission(&app_state, test_id, answer1, answer2)
            .await
            .unwrap();

        assert_eq!(result.total_score, 85);
        assert_eq!(result.debug.scoring_method, ScoringMethod::Fallback);
    }

    #[tokio::test(start_paused = true)]
    async fn ai_timeout_falls_back() {
        let app_state = state(Some(Arc::new(SlowScorer)));
        let (test_id, answer1, answer2) = answers();

        let result = process_submission(&app_state, test_id, answer1, answer2)
            .await
            .unwrap();

        assert!(result.debug.used_fallback);
        assert_eq!(result.total_score, 85);
    }

    #[tokio::test]
    async fn missing_or_blank_fields_are_rejected() {
        let app_state = state(None);

        let err = process_submission(&app_state, Some("t1".to_string()), None, Some("B".repeat(700)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = process_submission(
            &app_state,
            Some("t1".to_string()),
            Some("   ".to_string()),
            Some("B".repeat(700)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(app_state.results.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_test_is_not_found() {
        let app_state = state(None);
        let err = process_submission(
            &app_state,
            Some("t404".to_string()),
            Some("A".repeat(200)),
            Some("B".repeat(700)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn validator_rejections_surface_their_reason() {
        let app_state = state(None);
        let err = process_submission(
            &app_state,
            Some("t1".to_string()),
            Some("Too short".to_string()),
            Some("B".repeat(700)),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("question 1 is too short"));
    }
}
