//! Phase query handlers

use axum::extract::{Path, State};
use axum::Json;

use core_kernel::Protocol;
use domain_phases::PhaseStatistics;

use crate::dto::PhaseResponse;
use crate::error::ApiError;
use crate::AppState;

/// All phases of a protocol, newest opening first
pub async fn all_phases(
    State(state): State<AppState>,
    Path((source, number, check_digit)): Path<(u32, u32, u32)>,
) -> Result<Json<Vec<PhaseResponse>>, ApiError> {
    let protocol = Protocol::new(source, number, check_digit);
    let phases = state.phases.all_phases(protocol).await?;
    Ok(Json(phases.into_iter().map(PhaseResponse::from).collect()))
}

/// Open phases of a protocol, oldest opening first
pub async fn active_phases(
    State(state): State<AppState>,
    Path((source, number, check_digit)): Path<(u32, u32, u32)>,
) -> Result<Json<Vec<PhaseResponse>>, ApiError> {
    let protocol = Protocol::new(source, number, check_digit);
    let phases = state.phases.active_phases(protocol).await?;
    Ok(Json(phases.into_iter().map(PhaseResponse::from).collect()))
}

/// Aggregate statistics over a protocol's phases
pub async fn statistics(
    State(state): State<AppState>,
    Path((source, number, check_digit)): Path<(u32, u32, u32)>,
) -> Result<Json<PhaseStatistics>, ApiError> {
    let protocol = Protocol::new(source, number, check_digit);
    let statistics = state.phases.statistics(protocol).await?;
    Ok(Json(statistics))
}
