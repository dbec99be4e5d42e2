//! Claims Authorization Core - API Server Binary
//!
//! Starts the HTTP API server for the claims payment authorization core
//! wired over the in-memory adapters.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin claims-authorization-api
//!
//! # Run with environment variables
//! API_HOST=0.0.0.0 API_PORT=8080 cargo run --bin claims-authorization-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_VALIDATION_TIMEOUT_SECS` - Per-attempt validation timeout (default: 10)
//! * `API_VALIDATION_MAX_RETRIES` - Retries after the initial attempt (default: 3)
//! * `API_BREAKER_FAILURE_THRESHOLD` - Failures before a circuit opens (default: 5)
//! * `API_BREAKER_OPEN_SECS` - Seconds a circuit stays open (default: 30)

use std::net::SocketAddr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::{ClaimKey, Currency, Money, Protocol};
use domain_claims::{Claim, PolicyRef};
use domain_phases::PhaseEventRelationship;
use interface_api::{create_router, AppState, ApiConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env()?;
    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting Claims Authorization API Server"
    );

    let state = AppState::in_memory(&config);
    seed_demo_data(&state).await;

    let app = create_router(state);
    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Seeds a claim and the payment-event phase configuration so the server is
/// exercisable out of the box
async fn seed_demo_data(state: &AppState) {
    let now = chrono::Utc::now();
    let claim = Claim {
        key: ClaimKey::new(1, 10, 31, 123456),
        protocol: Protocol::new(1, 4231, 7),
        policy: PolicyRef {
            origin: 10,
            branch: 31,
            number: 88001,
        },
        leader: None,
        product_code: 6814,
        expected_reserve: Money::new(Decimal::new(100_000, 2), Currency::BRL),
        total_paid: Money::zero(Currency::BRL),
        occurrence_counter: 0,
        policy_insurance_type: 1,
        created_at: now,
        updated_at: now,
    };
    tracing::info!(claim = %claim.key, protocol = %claim.protocol, "seeding demo claim");
    state.store.insert_claim(claim).await;

    let effective = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");
    state
        .store
        .insert_relationship(
            PhaseEventRelationship::opens(20, 1098, effective)
                .with_phase_name("Payment settlement"),
        )
        .await;
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
