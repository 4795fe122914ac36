//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::{
    error::ApiError,
    web::{
        dto::{
            AnswerDto, AnswersDto, CriterionScoreDto, EssayTestDto, EssayTestSummaryDto,
            FeedbackDto, HealthResponse, QuestionDto, QuestionScoreDto, RankingEntryDto,
            RankingQuery, ResultDebugDto, ResultDto, SaveTargetsRequest, SaveTargetsResponse,
            ScoreBreakdownDto, ScoringCriteriaDto, SubmitRequest, SubmitResponse,
            TargetRankingDto,
        },
        envelope::{ApiResponse, ErrorReply},
        scoring_task::{process_submission, SCORING_COMPLETE_MESSAGE},
        state::AppState,
    },
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use essay_scoring_core::ranking::MAX_TARGET_UNIVERSITIES;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

/// User id assumed when a ranking request does not name one.
pub const DEFAULT_USER_ID: &str = "current-user";

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_tests_handler,
        get_test_handler,
        submit_handler,
        get_result_handler,
        list_results_handler,
        ranking_handler,
        save_targets_handler,
        health_handler,
    ),
    components(
        schemas(
            EssayTestSummaryDto, EssayTestDto, QuestionDto, ScoringCriteriaDto,
            SubmitRequest, SubmitResponse, ScoreBreakdownDto, QuestionScoreDto,
            CriterionScoreDto, FeedbackDto, ResultDto, AnswersDto, AnswerDto,
            ResultDebugDto, RankingEntryDto, TargetRankingDto, SaveTargetsRequest,
            SaveTargetsResponse, HealthResponse
        )
    ),
    tags(
        (name = "Essay Scoring API", description = "Timed essay tests, scoring and results.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Essay Tests
//=========================================================================================

/// List every available essay test.
#[utoipa::path(
    get,
    path = "/api/essay-test",
    responses(
        (status = 200, description = "Test summaries wrapped in the response envelope", body = [EssayTestSummaryDto])
    )
)]
pub async fn list_tests_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<ApiResponse<Vec<EssayTestSummaryDto>>, ErrorReply> {
    let tests = app_state
        .catalog
        .list_tests()
        .await
        .map_err(|e| app_state.reject(e))?;
    Ok(ApiResponse::ok(tests.into_iter().map(Into::into).collect()))
}

/// Fetch one essay test, including its passage and questions.
#[utoipa::path(
    get,
    path = "/api/essay-test/{id}",
    params(("id" = String, Path, description = "The test id.")),
    responses(
        (status = 200, description = "The test", body = EssayTestDto),
        (status = 404, description = "Unknown test id")
    )
)]
pub async fn get_test_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<EssayTestDto>, ErrorReply> {
    let test = app_state
        .catalog
        .get_test(&id)
        .await
        .map_err(|e| app_state.reject(e))?;
    Ok(ApiResponse::ok(test.into()))
}

//=========================================================================================
// Scoring and Results
//=========================================================================================

/// Score a pair of answers and store the result.
#[utoipa::path(
    post,
    path = "/api/scoring/submit",
    request_body = SubmitRequest,
    responses(
        (status = 200, description = "Scored and stored", body = SubmitResponse),
        (status = 400, description = "Missing fields or an unacceptable answer"),
        (status = 404, description = "Unknown test id"),
        (status = 413, description = "Request body too large"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn submit_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<ApiResponse<SubmitResponse>, ErrorReply> {
    let Json(request) = payload.map_err(|e| app_state.reject(rejection_error(e)))?;

    let result = process_submission(&app_state, request.test_id, request.answer1, request.answer2)
        .await
        .map_err(|e| app_state.reject(e))?;

    Ok(ApiResponse::ok(SubmitResponse {
        result_id: result.id,
        total_score: result.total_score,
        scores: result.scores.into(),
        message: SCORING_COMPLETE_MESSAGE.to_string(),
    }))
}

fn rejection_error(rejection: JsonRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(format!(
            "Request body exceeds {} bytes",
            crate::web::MAX_BODY_BYTES
        ))
    } else {
        ApiError::Validation(rejection.body_text())
    }
}

/// Fetch a stored result. Expired results answer 410 once and are then gone.
#[utoipa::path(
    get,
    path = "/api/results/{id}",
    params(("id" = String, Path, description = "The result id returned by the submit endpoint.")),
    responses(
        (status = 200, description = "The result", body = ResultDto),
        (status = 404, description = "No such result"),
        (status = 410, description = "The result has expired")
    )
)]
pub async fn get_result_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<ResultDto>, ErrorReply> {
    let result = app_state
        .results
        .get(&id)
        .await
        .map_err(|e| app_state.reject(e))?;
    Ok(ApiResponse::ok(result.into()))
}

/// List every stored result, oldest first.
#[utoipa::path(
    get,
    path = "/api/results",
    responses(
        (status = 200, description = "All stored results", body = [ResultDto])
    )
)]
pub async fn list_results_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<ApiResponse<Vec<ResultDto>>, ErrorReply> {
    let results = app_state
        .results
        .list()
        .await
        .map_err(|e| app_state.reject(e))?;
    Ok(ApiResponse::ok(results.into_iter().map(Into::into).collect()))
}

//=========================================================================================
// Rankings
//=========================================================================================

/// Fetch a target-university ranking or the national ranking.
#[utoipa::path(
    get,
    path = "/api/ranking",
    params(RankingQuery),
    responses(
        (status = 200, description = "A TargetRanking for type=target, a list of entries for type=national", body = TargetRankingDto),
        (status = 400, description = "Unknown type or missing universityId"),
        (status = 404, description = "Unknown university")
    )
)]
pub async fn ranking_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<RankingQuery>,
) -> Result<Response, ErrorReply> {
    let user_id = query.user_id.as_deref().unwrap_or(DEFAULT_USER_ID);

    match query.kind.as_deref() {
        Some("target") => {
            let university_id = query.university_id.as_deref().ok_or_else(|| {
                app_state.reject(ApiError::Validation(
                    "universityId is required for a target ranking".to_string(),
                ))
            })?;
            let ranking = app_state
                .rankings
                .target_ranking(university_id, user_id)
                .await
                .map_err(|e| app_state.reject(e))?;
            Ok(ApiResponse::ok(TargetRankingDto::from(ranking)).into_response())
        }
        Some("national") => {
            let entries = app_state
                .rankings
                .national_ranking(user_id)
                .await
                .map_err(|e| app_state.reject(e))?;
            let entries: Vec<RankingEntryDto> = entries.into_iter().map(Into::into).collect();
            Ok(ApiResponse::ok(entries).into_response())
        }
        other => Err(app_state.reject(ApiError::Validation(format!(
            "Unknown ranking type '{}', expected target or national",
            other.unwrap_or_default()
        )))),
    }
}

pub const TARGETS_SAVED_MESSAGE: &str = "Target universities saved";

/// Save the universities a user follows.
#[utoipa::path(
    post,
    path = "/api/ranking",
    request_body = SaveTargetsRequest,
    responses(
        (status = 200, description = "The saved list", body = SaveTargetsResponse),
        (status = 400, description = "Missing userId, or targetUniversities is not a list of at most three ids"),
        (status = 404, description = "Unknown university")
    )
)]
pub async fn save_targets_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<SaveTargetsRequest>, JsonRejection>,
) -> Result<ApiResponse<SaveTargetsResponse>, ErrorReply> {
    let Json(request) = payload.map_err(|e| app_state.reject(rejection_error(e)))?;
    let (user_id, university_ids) =
        check_targets_request(request).map_err(|e| app_state.reject(e))?;

    let saved = app_state
        .rankings
        .save_targets(&user_id, university_ids)
        .await
        .map_err(|e| app_state.reject(e))?;

    Ok(ApiResponse::ok_with_message(
        SaveTargetsResponse {
            target_universities: saved,
            timestamp: Utc::now(),
        },
        TARGETS_SAVED_MESSAGE,
    ))
}

fn check_targets_request(request: SaveTargetsRequest) -> Result<(String, Vec<String>), ApiError> {
    let user_id = request
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("userId is required".to_string()))?;

    let not_a_list = || ApiError::Validation("targetUniversities must be an array".to_string());
    let university_ids = match request.target_universities {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(id) => Ok(id),
                _ => Err(not_a_list()),
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(not_a_list()),
    };

    if university_ids.len() > MAX_TARGET_UNIVERSITIES {
        return Err(ApiError::Validation(format!(
            "Maximum {} target universities allowed",
            MAX_TARGET_UNIVERSITIES
        )));
    }
    Ok((user_id, university_ids))
}

//=========================================================================================
// Health and Fallback
//=========================================================================================

/// Liveness check. Not wrapped in the response envelope.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "The server is up", body = HealthResponse))
)]
pub async fn health_handler(State(app_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now(),
        uptime: app_state.started_at.elapsed().as_secs_f64(),
        environment: app_state.config.environment.as_str().to_string(),
    })
}

/// Answers any unmatched route.
pub async fn not_found_handler(uri: Uri) -> impl IntoResponse {
    info!("No route for {}", uri);
    (
        StatusCode::NOT_FOUND,
        ApiResponse::<()>::failure("Endpoint not found", Some(uri.path().to_string())),
    )
}
