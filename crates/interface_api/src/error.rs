//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use domain_authorization::AuthorizationError;
use domain_claims::ClaimError;
use domain_phases::PhaseError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                msg.clone(),
            ),
            ApiError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                msg.clone(),
            ),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthorizationError> for ApiError {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::ClaimNotFound(msg) => ApiError::NotFound(msg),
            AuthorizationError::AuthorizationNotFound(id) => ApiError::NotFound(id.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<PhaseError> for ApiError {
    fn from(err: PhaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::ClaimNotFound(msg) => ApiError::NotFound(msg),
            ClaimError::InvalidSearchCriteria(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
