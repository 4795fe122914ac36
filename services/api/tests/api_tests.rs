//! End-to-end tests: the full router served on an ephemeral port, called over HTTP.

use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request, StatusCode},
};
use tower::ServiceExt;

use api_lib::{
    adapters::StaticCatalog,
    client::{ClientError, EssayApiClient},
    config::{Config, Environment},
    web::{build_router, state::AppState},
};
use essay_scoring_core::{
    ports::TestCatalog,
    session::{WRITING_TIME, READING_TIME},
    SessionPhase, Submission, TestSession, TickOutcome,
};
use serde_json::Value;

async fn spawn_app(config: Config) -> String {
    let app_state = Arc::new(AppState::in_memory(Arc::new(config), None));
    let app = build_router(app_state).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", address)
}

fn scenario_submission() -> Submission {
    Submission {
        test_id: "t1".to_string(),
        answer1: "A".repeat(200),
        answer2: "B".repeat(700),
    }
}

#[tokio::test]
async fn submit_then_fetch_the_result() {
    let base_url = spawn_app(Config::default()).await;
    let client = EssayApiClient::new(&base_url);

    let submitted = client.submit(&scenario_submission()).await.unwrap();
    assert_eq!(submitted.total_score, 85);
    assert_eq!(submitted.scores.question1.total, 25);
    assert_eq!(submitted.scores.question2.total, 60);
    assert_eq!(submitted.scores.question1.breakdown.len(), 3);
    assert_eq!(submitted.scores.question2.breakdown.len(), 4);

    let result = client.get_result(&submitted.result_id).await.unwrap();
    assert_eq!(result.id, submitted.result_id);
    assert_eq!(result.test_id, "t1");
    assert_eq!(result.total_score, 85);
    assert_eq!(result.answers.question1.length, 200);
    assert_eq!(result.answer2.len(), 700);
    assert!(result.debug.used_fallback);
    assert_eq!(result.debug.scoring_method, "fallback");
    assert_eq!(
        result.expires_at,
        (result.submitted_at + chrono::Duration::days(30)).timestamp_millis()
    );

    let all = client.list_results().await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn unknown_result_is_a_404_envelope() {
    let base_url = spawn_app(Config::default()).await;

    let response = reqwest::get(format!("{}/api/results/nonexistent", base_url))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn expired_result_is_gone_once_then_not_found() {
    let config = Config {
        result_ttl: chrono::Duration::zero(),
        ..Config::default()
    };
    let base_url = spawn_app(config).await;
    let client = EssayApiClient::new(&base_url);

    let submitted = client.submit(&scenario_submission()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(matches!(
        client.get_result(&submitted.result_id).await,
        Err(ClientError::Gone(_))
    ));
    assert!(matches!(
        client.get_result(&submitted.result_id).await,
        Err(ClientError::NotFound(_))
    ));
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    let base_url = spawn_app(Config::default()).await;
    let http = reqwest::Client::new();

    let response = http
        .post(format!("{}/api/scoring/submit", base_url))
        .json(&serde_json::json!({"testId": "t1", "answer1": "A".repeat(200)}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);

    let response = http
        .post(format!("{}/api/scoring/submit", base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let results = EssayApiClient::new(&base_url).list_results().await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn rejected_answers_report_the_reason() {
    let base_url = spawn_app(Config::default()).await;
    let client = EssayApiClient::new(&base_url);

    let submission = Submission {
        answer1: "A".repeat(500),
        ..scenario_submission()
    };
    match client.submit(&submission).await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("too long"));
        }
        other => panic!("expected a 400, got {:?}", other),
    }
}

#[tokio::test]
async fn unknown_test_is_not_found() {
    let base_url = spawn_app(Config::default()).await;
    let client = EssayApiClient::new(&base_url);

    assert!(matches!(client.get_test("t999").await, Err(ClientError::NotFound(_))));

    let submission = Submission {
        test_id: "t999".to_string(),
        ..scenario_submission()
    };
    assert!(matches!(client.submit(&submission).await, Err(ClientError::NotFound(_))));
}

#[tokio::test]
async fn lists_and_fetches_tests() {
    let base_url = spawn_app(Config::default()).await;
    let client = EssayApiClient::new(&base_url);

    let tests = client.list_tests().await.unwrap();
    assert!(!tests.is_empty());

    let test = client.get_test(&tests[0].id).await.unwrap();
    assert_eq!(test.title, tests[0].title);
    assert_eq!(test.question1.points + test.question2.points, test.total_points);
    assert!(!test.essay_text.is_empty());
}

#[tokio::test]
async fn health_is_not_enveloped() {
    let config = Config {
        environment: Environment::Production,
        ..Config::default()
    };
    let base_url = spawn_app(config).await;

    let health = EssayApiClient::new(&base_url).health().await.unwrap();
    assert_eq!(health.status, "OK");
    assert_eq!(health.environment, "production");
    assert!(health.uptime >= 0.0);

    let body: Value = reqwest::get(format!("{}/health", base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body.get("success").is_none());
}

#[tokio::test]
async fn unknown_routes_get_a_404_envelope() {
    let base_url = spawn_app(Config::default()).await;

    let response = reqwest::get(format!("{}/api/nothing-here", base_url))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "/api/nothing-here");
}

#[tokio::test]
async fn rankings() {
    let base_url = spawn_app(Config::default()).await;
    let client = EssayApiClient::new(&base_url);

    let target = client.target_ranking("tokyo-univ", "me").await.unwrap();
    assert_eq!(target.university_id, "tokyo-univ");
    assert!(target.entries.len() <= 10);
    assert!(target
        .entries
        .windows(2)
        .all(|w| w[0].total_score >= w[1].total_score));

    let national = client.national_ranking("me").await.unwrap();
    assert!(national.iter().any(|e| e.user_id == "me"));

    assert!(matches!(
        client.target_ranking("atlantis-univ", "me").await,
        Err(ClientError::NotFound(_))
    ));

    let response = reqwest::get(format!("{}/api/ranking?type=regional", base_url))
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let response = reqwest::get(format!("{}/api/ranking?type=target", base_url))
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn target_universities_are_saved_and_checked() {
    let base_url = spawn_app(Config::default()).await;
    let client = EssayApiClient::new(&base_url);

    let saved = client
        .save_targets("u1", &["tokyo-univ", "waseda-univ"])
        .await
        .unwrap();
    assert_eq!(saved.target_universities, vec!["tokyo-univ", "waseda-univ"]);

    let http = reqwest::Client::new();
    let response = http
        .post(format!("{}/api/ranking", base_url))
        .json(&serde_json::json!({"userId": "u1", "targetUniversities": ["kyoto-univ"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Target universities saved");
    assert_eq!(body["data"]["targetUniversities"], serde_json::json!(["kyoto-univ"]));

    let rejected = [
        (serde_json::json!({"targetUniversities": ["kyoto-univ"]}), "userId is required"),
        (
            serde_json::json!({"userId": "u1", "targetUniversities": "kyoto-univ"}),
            "targetUniversities must be an array",
        ),
        (
            serde_json::json!({
                "userId": "u1",
                "targetUniversities": ["tokyo-univ", "kyoto-univ", "osaka-univ", "keio-univ"]
            }),
            "Maximum 3 target universities allowed",
        ),
    ];
    for (payload, expected) in rejected {
        let response = http
            .post(format!("{}/api/ranking", base_url))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400, "{}", payload);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], expected);
    }

    assert!(matches!(
        client.save_targets("u1", &["atlantis-univ"]).await,
        Err(ClientError::NotFound(_))
    ));
}

#[tokio::test]
async fn request_bodies_up_to_ten_megabytes_are_read() {
    let base_url = spawn_app(Config::default()).await;
    let http = reqwest::Client::new();

    let large = serde_json::json!({
        "testId": "t1",
        "answer1": "A".repeat(5 * 1024 * 1024),
        "answer2": "B".repeat(700),
    });
    let response = http
        .post(format!("{}/api/scoring/submit", base_url))
        .json(&large)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("too long"));

}

#[tokio::test]
async fn oversized_bodies_get_an_enveloped_413() {
    let app_state = Arc::new(AppState::in_memory(Arc::new(Config::default()), None));
    let app = build_router(app_state).unwrap();

    let oversized = serde_json::json!({
        "testId": "t1",
        "answer1": "A".repeat(11 * 1024 * 1024),
        "answer2": "B".repeat(700),
    });
    let request = Request::builder()
        .method("POST")
        .uri("/api/scoring/submit")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(oversized.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("exceeds"));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let base_url = spawn_app(Config::default()).await;

    let document: Value = reqwest::get(format!("{}/api-docs/openapi.json", base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(document["paths"]["/api/scoring/submit"].is_object());
    assert!(document["paths"]["/api/ranking"]["get"].is_object());
    assert!(document["paths"]["/api/ranking"]["post"].is_object());
}

#[tokio::test]
async fn a_session_runs_from_reading_to_completed() {
    let base_url = spawn_app(Config::default()).await;
    let client = EssayApiClient::new(&base_url);
    let test = StaticCatalog::builtin().get_test("t1").await.unwrap();

    let mut session = TestSession::new("t1");
    session.on_test_loaded(Some(test)).unwrap();
    assert_eq!(session.time_left(), READING_TIME);
    assert_eq!(session.tick(READING_TIME), TickOutcome::ReadingFinished);

    session.set_answers(format!("  {}  ", "A".repeat(200)), "B".repeat(700)).unwrap();
    let submission = session.submit().unwrap();
    assert_eq!(submission.answer1.len(), 200);
    assert_eq!(session.phase(), &SessionPhase::Submitting);

    let submitted = client.submit(&submission).await.unwrap();
    session.on_submit_succeeded(submitted.result_id.clone()).unwrap();
    assert_eq!(session.phase(), &SessionPhase::Completed);
    assert_eq!(session.result_id(), Some(submitted.result_id.as_str()));
}

#[tokio::test]
async fn a_forced_submission_the_server_rejects_returns_to_writing() {
    let base_url = spawn_app(Config::default()).await;
    let client = EssayApiClient::new(&base_url);
    let test = StaticCatalog::builtin().get_test("t1").await.unwrap();

    let mut session = TestSession::new("t1");
    session.on_test_loaded(Some(test)).unwrap();
    session.end_reading().unwrap();
    session.set_answers("short", "also short").unwrap();

    let submission = match session.tick(WRITING_TIME) {
        TickOutcome::AutoSubmit(submission) => submission,
        other => panic!("expected an auto-submit, got {:?}", other),
    };

    let err = client.submit(&submission).await.unwrap_err();
    session.on_submit_failed(err.to_string()).unwrap();
    assert_eq!(session.phase(), &SessionPhase::Writing);
    assert!(session.last_error().is_some());

    assert_eq!(session.tick(Duration::from_secs(1)), TickOutcome::Running);
    assert_eq!(session.phase(), &SessionPhase::Writing);
    assert!(client.list_results().await.unwrap().is_empty());

    session.set_answers("A".repeat(200), "B".repeat(700)).unwrap();
    let retry = session.submit().unwrap();
    let submitted = client.submit(&retry).await.unwrap();
    session.on_submit_succeeded(submitted.result_id).unwrap();
    assert_eq!(session.phase(), &SessionPhase::Completed);
}
