//! services/api/src/bin/api.rs

use api_lib::{
    adapters::OpenAiScoringAdapter,
    config::Config,
    error::ApiError,
    web::{build_router, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use essay_scoring_core::ports::EssayScorer;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(
        "Configuration loaded ({}). Starting server...",
        config.environment.as_str()
    );

    // --- 2. Initialize the Optional AI Scorer ---
    let ai_scorer: Option<Arc<dyn EssayScorer>> = match &config.openai_api_key {
        Some(api_key) => {
            let openai_client = Client::with_config(OpenAIConfig::new().with_api_key(api_key));
            info!(
                "AI scoring enabled with model {} (timeout {:?})",
                config.scoring_model, config.ai_scoring_timeout
            );
            let scorer: Arc<dyn EssayScorer> = Arc::new(OpenAiScoringAdapter::new(
                openai_client,
                config.scoring_model.clone(),
            ));
            Some(scorer)
        }
        None => {
            warn!("OPENAI_API_KEY is not set. Every submission will use fallback scoring.");
            None
        }
    };

    // --- 3. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState::in_memory(config.clone(), ai_scorer));
    let app = build_router(app_state)?;

    // --- 4. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
