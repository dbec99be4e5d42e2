//! Claim search handler

use axum::extract::State;
use axum::Json;

use domain_claims::{ClaimSearch, SearchCriteria};

use crate::dto::ClaimResponse;
use crate::error::ApiError;
use crate::AppState;

/// Finds a claim by one of the three search intents
pub async fn search(
    State(state): State<AppState>,
    Json(criteria): Json<SearchCriteria>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let search = ClaimSearch::from_criteria(&criteria)?;
    state
        .store
        .find_claim(&search)
        .await
        .map(|claim| Json(ClaimResponse::from(claim)))
        .ok_or_else(|| ApiError::NotFound("no claim matches the search criteria".to_string()))
}
