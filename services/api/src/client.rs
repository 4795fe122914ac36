//! services/api/src/client.rs
//!
//! A typed HTTP client for the REST API, used by frontends and the integration tests.
//! Every call either returns the decoded payload or a `ClientError`; failures are
//! never turned into placeholder data.

use essay_scoring_core::domain::Submission;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::web::{
    dto::{
        EssayTestDto, EssayTestSummaryDto, HealthResponse, RankingEntryDto, ResultDto,
        SaveTargetsRequest, SaveTargetsResponse, SubmitRequest, SubmitResponse, TargetRankingDto,
    },
    envelope::ApiResponse,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server could not be reached or the connection broke.
    #[error("Network error: {0}")]
    Network(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Expired: {0}")]
    Gone(String),
    /// Any other unsuccessful response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Could not decode the response: {0}")]
    Decode(String),
}

pub struct EssayApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl EssayApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:5000`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list_tests(&self) -> Result<Vec<EssayTestSummaryDto>, ClientError> {
        self.call(self.http.get(self.url("/api/essay-test"))).await
    }

    pub async fn get_test(&self, test_id: &str) -> Result<EssayTestDto, ClientError> {
        self.call(self.http.get(self.url(&format!("/api/essay-test/{}", test_id))))
            .await
    }

    pub async fn submit(&self, submission: &Submission) -> Result<SubmitResponse, ClientError> {
        let body = SubmitRequest {
            test_id: Some(submission.test_id.clone()),
            answer1: Some(submission.answer1.clone()),
            answer2: Some(submission.answer2.clone()),
        };
        self.call(self.http.post(self.url("/api/scoring/submit")).json(&body))
            .await
    }

    pub async fn get_result(&self, result_id: &str) -> Result<ResultDto, ClientError> {
        self.call(self.http.get(self.url(&format!("/api/results/{}", result_id))))
            .await
    }

    pub async fn list_results(&self) -> Result<Vec<ResultDto>, ClientError> {
        self.call(self.http.get(self.url("/api/results"))).await
    }

    pub async fn target_ranking(
        &self,
        university_id: &str,
        user_id: &str,
    ) -> Result<TargetRankingDto, ClientError> {
        let request = self.http.get(self.url("/api/ranking")).query(&[
            ("type", "target"),
            ("universityId", university_id),
            ("userId", user_id),
        ]);
        self.call(request).await
    }

    pub async fn national_ranking(&self, user_id: &str) -> Result<Vec<RankingEntryDto>, ClientError> {
        let request = self
            .http
            .get(self.url("/api/ranking"))
            .query(&[("type", "national"), ("userId", user_id)]);
        self.call(request).await
    }

    pub async fn save_targets(
        &self,
        user_id: &str,
        university_ids: &[&str],
    ) -> Result<SaveTargetsResponse, ClientError> {
        let body = SaveTargetsRequest {
            user_id: Some(user_id.to_string()),
            target_universities: Some(serde_json::json!(university_ids)),
        };
        self.call(self.http.post(self.url("/api/ranking")).json(&body))
            .await
    }

    /// `/health` is the one endpoint that is not enveloped.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self
            .http
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: format!("Health check failed with {}", status),
            });
        }
        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Sends `request` and unwraps the response envelope.
    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(ClientError::Decode(e.to_string())),
            Err(_) => {
                warn!("Unreadable {} response from the API", status);
                return Err(error_for(status, body));
            }
        };

        if status.is_success() && envelope.success {
            return envelope
                .data
                .ok_or_else(|| ClientError::Decode("Response envelope has no data".to_string()));
        }

        let message = envelope
            .error
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
        Err(error_for(status, message))
    }
}

fn error_for(status: StatusCode, message: String) -> ClientError {
    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::GONE => ClientError::Gone(message),
        _ => ClientError::Api {
            status: status.as_u16(),
            message,
        },
    }
}
