//! Health and routing metadata handlers

use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use domain_validation::RoutingInfo;

use crate::AppState;

/// Liveness check
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Health of the three external validation systems
pub async fn validators_health(State(state): State<AppState>) -> Json<HashMap<String, bool>> {
    Json(state.router.check_all_services_health().await)
}

/// Static routing rules of the validation router
pub async fn routing_info(State(state): State<AppState>) -> Json<RoutingInfo> {
    Json(state.router.routing_info())
}
