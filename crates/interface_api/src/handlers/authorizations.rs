//! Payment authorization handlers

use axum::extract::{Path, State};
use axum::Json;
use validator::Validate;

use core_kernel::AuthorizationId;
use domain_authorization::{AuthorizationRequest, AuthorizationResponse, ValidationReport};

use crate::dto::{
    AuthorizePaymentRequest, CancelAuthorizationRequest, CancelAuthorizationResponse,
};
use crate::error::ApiError;
use crate::AppState;

fn parse_authorization_id(id: &str) -> Result<AuthorizationId, ApiError> {
    id.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid authorization id: {id}")))
}

fn validated(request: AuthorizePaymentRequest) -> Result<AuthorizationRequest, ApiError> {
    request
        .validate()
        .map_err(|err| ApiError::Validation(err.to_string()))?;
    Ok(request.into())
}

/// Authorizes one payment
pub async fn authorize(
    State(state): State<AppState>,
    Json(request): Json<AuthorizePaymentRequest>,
) -> Result<Json<AuthorizationResponse>, ApiError> {
    let request = validated(request)?;
    let response = state.orchestrator.authorize(request).await?;
    Ok(Json(response))
}

/// Dry-run validation: preconditions and routing, no persistence
pub async fn validate(
    State(state): State<AppState>,
    Json(request): Json<AuthorizePaymentRequest>,
) -> Result<Json<ValidationReport>, ApiError> {
    let request = validated(request)?;
    let report = state.orchestrator.validate(&request).await?;
    Ok(Json(report))
}

/// Looks up a previous authorization outcome
pub async fn get_authorization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AuthorizationResponse>, ApiError> {
    let id = parse_authorization_id(&id)?;
    state
        .orchestrator
        .find_authorization(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(id.to_string()))
}

/// Cancels a pending authorization
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CancelAuthorizationRequest>,
) -> Result<Json<CancelAuthorizationResponse>, ApiError> {
    request
        .validate()
        .map_err(|err| ApiError::Validation(err.to_string()))?;
    let id = parse_authorization_id(&id)?;
    let cancelled = state
        .orchestrator
        .cancel(id, &request.cancelled_by, &request.reason)
        .await;
    Ok(Json(CancelAuthorizationResponse { cancelled }))
}

/// Re-runs a previous authorization as a new attempt
pub async fn retry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AuthorizationResponse>, ApiError> {
    let id = parse_authorization_id(&id)?;
    let response = state.orchestrator.retry(id).await?;
    Ok(Json(response))
}
