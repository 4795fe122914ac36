//! services/api/src/web/envelope.rs
//!
//! The `{success, data, error, message}` wrapper used by every `/api` response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{config::Environment, error::ApiError};

/// Message shown for any 5xx in production.
pub const GENERIC_INTERNAL_ERROR: &str = "An internal server error occurred";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    /// A success that also carries a human-readable note.
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }

    pub fn failure(error: impl Into<String>, message: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// An error already rendered for the client, with its status code.
#[derive(Debug)]
pub struct ErrorReply {
    pub status: StatusCode,
    pub body: ApiResponse<()>,
}

impl ErrorReply {
    /// Logs `err` and renders it. Internal details only leave the server in development.
    pub fn from_error(err: ApiError, environment: Environment) -> Self {
        let status = err.status();
        let body = if status.is_server_error() {
            error!("Request failed: {:?}", err);
            let detail = match environment {
                Environment::Development => Some(err.to_string()),
                Environment::Production => None,
            };
            ApiResponse::failure(GENERIC_INTERNAL_ERROR, detail)
        } else {
            warn!("Request rejected ({}): {}", status, err);
            ApiResponse::failure(err.to_string(), None)
        };
        Self { status, body }
    }
}

impl IntoResponse for ErrorReply {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
