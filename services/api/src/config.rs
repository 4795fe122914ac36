//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Deployment mode. Controls how much detail internal errors expose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("'{}' is not development or production", other)),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub environment: Environment,
    pub frontend_url: String,
    pub openai_api_key: Option<String>,
    pub scoring_model: String,
    pub ai_scoring_timeout: Duration,
    pub result_ttl: chrono::Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 5000)),
            log_level: Level::INFO,
            environment: Environment::Development,
            frontend_url: "http://localhost:3000".to_string(),
            openai_api_key: None,
            scoring_model: "gpt-4o-mini".to_string(),
            ai_scoring_timeout: Duration::from_secs(30),
            result_ttl: chrono::Duration::days(30),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        let defaults = Self::default();

        // --- Server Settings ---
        let bind_address = match std::env::var("BIND_ADDRESS") {
            Ok(value) => value.parse::<SocketAddr>().map_err(|e| {
                ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
            })?,
            Err(_) => defaults.bind_address,
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let environment = match std::env::var("APP_ENV") {
            Ok(value) => value
                .parse::<Environment>()
                .map_err(|e| ConfigError::InvalidValue("APP_ENV".to_string(), e))?,
            Err(_) => defaults.environment,
        };

        let frontend_url = std::env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url);

        // --- Scoring Settings ---
        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let scoring_model = std::env::var("SCORING_MODEL").unwrap_or(defaults.scoring_model);
        let ai_scoring_timeout = match std::env::var("AI_SCORING_TIMEOUT_SECS") {
            Ok(value) => Duration::from_secs(parse_number("AI_SCORING_TIMEOUT_SECS", &value)?),
            Err(_) => defaults.ai_scoring_timeout,
        };

        // --- Result Storage ---
        let result_ttl = match std::env::var("RESULT_TTL_DAYS") {
            Ok(value) => chrono::Duration::days(parse_number("RESULT_TTL_DAYS", &value)? as i64),
            Err(_) => defaults.result_ttl,
        };

        Ok(Self {
            bind_address,
            log_level,
            environment,
            frontend_url,
            openai_api_key,
            scoring_model,
            ai_scoring_timeout,
            result_ttl,
        })
    }
}

fn parse_number(var: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|e| {
        ConfigError::InvalidValue(var.to_string(), format!("'{}': {}", value, e))
    })
}
