//! HTTP API Layer
//!
//! This crate exposes the claims authorization core over REST using Axum:
//!
//! - **Authorizations**: authorize, dry-run validate, look up, cancel, retry
//! - **Phases**: per-protocol listing, active phases, statistics
//! - **Claims**: search by protocol, claim number or leader
//! - **Health**: liveness plus per-validator health and routing metadata
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState, ApiConfig};
//!
//! let state = AppState::in_memory(&ApiConfig::default());
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod dto;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_authorization::AuthorizationOrchestrator;
use domain_phases::PhaseLifecycleEngine;
use domain_validation::{
    ExternalValidationClient, ResiliencePolicy, ValidationRouter, ValidationService,
};
use infra_memory::{FixedRates, InMemoryValidationGateway, MemoryStore, SystemBusinessDate};

pub use config::ApiConfig;

use crate::handlers::{authorizations, claims, health, phases};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<AuthorizationOrchestrator>,
    pub phases: Arc<PhaseLifecycleEngine>,
    pub router: Arc<ValidationRouter>,
    pub store: Arc<MemoryStore>,
    /// Gateways behind the validation clients, exposed for seeding and demos
    pub gateways: ValidationGateways,
}

/// The three in-process validation gateways
#[derive(Clone)]
pub struct ValidationGateways {
    pub cnoua: Arc<InMemoryValidationGateway>,
    pub sipua: Arc<InMemoryValidationGateway>,
    pub simda: Arc<InMemoryValidationGateway>,
}

impl AppState {
    /// Wires the whole system over the in-memory adapters
    pub fn in_memory(config: &ApiConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let gateways = ValidationGateways {
            cnoua: Arc::new(InMemoryValidationGateway::new()),
            sipua: Arc::new(InMemoryValidationGateway::new()),
            simda: Arc::new(InMemoryValidationGateway::new()),
        };

        // One long-lived policy per external system; the breaker state is
        // shared by every call to that system
        let router = Arc::new(ValidationRouter::new(
            Arc::new(ExternalValidationClient::new(
                ValidationService::Cnoua,
                gateways.cnoua.clone(),
                Arc::new(ResiliencePolicy::new(config.resilience())),
            )),
            Arc::new(ExternalValidationClient::new(
                ValidationService::Sipua,
                gateways.sipua.clone(),
                Arc::new(ResiliencePolicy::new(config.resilience())),
            )),
            Arc::new(ExternalValidationClient::new(
                ValidationService::Simda,
                gateways.simda.clone(),
                Arc::new(ResiliencePolicy::new(config.resilience())),
            )),
        ));

        let dates = Arc::new(SystemBusinessDate);
        let phases = Arc::new(PhaseLifecycleEngine::new(
            store.clone(),
            store.clone(),
            dates.clone(),
        ));
        let orchestrator = Arc::new(AuthorizationOrchestrator::new(
            store.clone(),
            router.clone(),
            phases.clone(),
            dates,
            Arc::new(FixedRates::unit()),
        ));

        Self {
            orchestrator,
            phases,
            router,
            store,
            gateways,
        }
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let authorization_routes = Router::new()
        .route("/", post(authorizations::authorize))
        .route("/validate", post(authorizations::validate))
        .route("/:id", get(authorizations::get_authorization))
        .route("/:id/cancel", post(authorizations::cancel))
        .route("/:id/retry", post(authorizations::retry));

    let phase_routes = Router::new()
        .route("/:source/:number/:check_digit/phases", get(phases::all_phases))
        .route(
            "/:source/:number/:check_digit/phases/active",
            get(phases::active_phases),
        )
        .route(
            "/:source/:number/:check_digit/phases/statistics",
            get(phases::statistics),
        );

    let claim_routes = Router::new().route("/search", post(claims::search));

    let api_routes = Router::new()
        .nest("/authorizations", authorization_routes)
        .nest("/protocols", phase_routes)
        .nest("/claims", claim_routes)
        .route("/validators/health", get(health::validators_health))
        .route("/validators/routing", get(health::routing_info));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
