//! services/api/src/web/mod.rs
//!
//! HTTP surface of the service: the router and everything it dispatches to.

pub mod dto;
pub mod envelope;
pub mod rest;
pub mod scoring_task;
pub mod state;

use crate::{error::ApiError, web::state::AppState};
use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use rest::{
    get_result_handler, get_test_handler, health_handler, list_results_handler,
    list_tests_handler, not_found_handler, ranking_handler, save_targets_handler, submit_handler,
    ApiDoc,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Builds the complete application: `/api` routes, `/health`, Swagger UI and the 404 fallback.
pub fn build_router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .frontend_url
        .parse::<HeaderValue>()
        .map_err(|e| {
            ApiError::Internal(format!(
                "Invalid frontend URL '{}': {}",
                app_state.config.frontend_url, e
            ))
        })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    let api_router = Router::new()
        .route("/essay-test", get(list_tests_handler))
        .route("/essay-test/{id}", get(get_test_handler))
        .route("/scoring/submit", post(submit_handler))
        .route("/results", get(list_results_handler))
        .route("/results/{id}", get(get_result_handler))
        .route("/ranking", get(ranking_handler).post(save_targets_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    let app = Router::new()
        .nest("/api", api_router)
        .route("/health", get(health_handler))
        .with_state(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}
