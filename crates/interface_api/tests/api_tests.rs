//! HTTP API tests

use axum::http::StatusCode;
use axum_test::TestServer;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use interface_api::{create_router, ApiConfig, AppState};
use test_utils::{IdFixtures, PhaseFixtures, TestClaimBuilder};

async fn server_with_state() -> (TestServer, AppState) {
    let state = AppState::in_memory(&ApiConfig::default());
    state
        .store
        .insert_claim(TestClaimBuilder::new().build())
        .await;
    state
        .store
        .insert_relationship(PhaseFixtures::settlement_opens_on_payment())
        .await;
    let server = TestServer::new(create_router(state.clone())).unwrap();
    (server, state)
}

fn authorize_body(amount: &str) -> Value {
    json!({
        "insurance_type": 1,
        "origin": 10,
        "branch": 31,
        "claim_number": 123456,
        "payment_type": 1,
        "amount": amount,
        "beneficiary": "MARIA DA SILVA",
        "contract_number": 500,
        "operator_id": "OP1234"
    })
}

#[tokio::test]
async fn health_endpoint_answers_ok() {
    let (server, _state) = server_with_state().await;

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn authorization_round_trip_over_http() {
    let (server, state) = server_with_state().await;

    let response = server
        .post("/api/v1/authorizations")
        .json(&authorize_body("100.00"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "APPROVED");
    assert_eq!(body["occurrence"], 1);
    assert_eq!(body["validation_results"][0]["service"], "CNOUA");

    // The claim totals moved
    let claim = state.store.claim(&IdFixtures::claim_key()).await.unwrap();
    assert_eq!(claim.total_paid.amount(), dec!(100.00));

    // The outcome is retrievable by id
    let id = body["authorization_id"].as_str().unwrap();
    let lookup = server
        .get(&format!("/api/v1/authorizations/{id}"))
        .await;
    assert_eq!(lookup.status_code(), StatusCode::OK);
    assert_eq!(lookup.json::<Value>()["status"], "APPROVED");
}

#[tokio::test]
async fn authorization_opens_the_configured_phase() {
    let (server, _state) = server_with_state().await;

    server
        .post("/api/v1/authorizations")
        .json(&authorize_body("100.00"))
        .await;

    let protocol = IdFixtures::protocol();
    let path = format!(
        "/api/v1/protocols/{}/{}/{}/phases/active",
        protocol.source, protocol.number, protocol.check_digit
    );
    let response = server.get(&path).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let phases = response.json::<Value>();
    assert_eq!(phases.as_array().unwrap().len(), 1);
    assert_eq!(phases[0]["phase_code"], 20);
    assert_eq!(phases[0]["is_open"], true);
    assert_eq!(phases[0]["name"], "Payment settlement");

    let statistics = server
        .get(&format!(
            "/api/v1/protocols/{}/{}/{}/phases/statistics",
            protocol.source, protocol.number, protocol.check_digit
        ))
        .await
        .json::<Value>();
    assert_eq!(statistics["total"], 1);
    assert_eq!(statistics["open"], 1);
}

#[tokio::test]
async fn invalid_payment_type_fails_request_validation() {
    let (server, _state) = server_with_state().await;

    let mut body = authorize_body("100.00");
    body["payment_type"] = json!(9);
    let response = server.post("/api/v1/authorizations").json(&body).await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn over_pending_amount_is_rejected_with_details() {
    let (server, _state) = server_with_state().await;

    let response = server
        .post("/api/v1/authorizations")
        .json(&authorize_body("1000.01"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "REJECTED");
    assert!(body["errors"][0]
        .as_str()
        .unwrap()
        .contains("exceeds pending balance"));
}

#[tokio::test]
async fn unknown_claim_is_not_found() {
    let (server, _state) = server_with_state().await;

    let mut body = authorize_body("100.00");
    body["claim_number"] = json!(999);
    let response = server.post("/api/v1/authorizations").json(&body).await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dry_run_reports_routing_without_persisting() {
    let (server, state) = server_with_state().await;

    let response = server
        .post("/api/v1/authorizations/validate")
        .json(&authorize_body("100.00"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["valid"], true);
    assert_eq!(body["required_service"], "CNOUA");

    let claim = state.store.claim(&IdFixtures::claim_key()).await.unwrap();
    assert_eq!(claim.total_paid.amount(), dec!(0));
}

#[tokio::test]
async fn cancel_of_resolved_authorization_reports_false() {
    let (server, _state) = server_with_state().await;

    let body = server
        .post("/api/v1/authorizations")
        .json(&authorize_body("100.00"))
        .await
        .json::<Value>();
    let id = body["authorization_id"].as_str().unwrap();

    let response = server
        .post(&format!("/api/v1/authorizations/{id}/cancel"))
        .json(&json!({ "cancelled_by": "SUPERVISOR", "reason": "desk request" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["cancelled"], false);
}

#[tokio::test]
async fn retry_of_unknown_authorization_is_not_found() {
    let (server, _state) = server_with_state().await;

    let response = server
        .post(&format!(
            "/api/v1/authorizations/{}/retry",
            uuid_like_unknown()
        ))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

fn uuid_like_unknown() -> String {
    "00000000-0000-4000-8000-000000000000".to_string()
}

#[tokio::test]
async fn claim_search_by_protocol_finds_the_claim() {
    let (server, _state) = server_with_state().await;

    let response = server
        .post("/api/v1/claims/search")
        .json(&json!({
            "protocol_source": 1,
            "protocol_number": 4231,
            "check_digit": 7
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["claim_number"], 123456);
    assert_eq!(body["pending"], "1000.00");
}

#[tokio::test]
async fn incomplete_search_criteria_are_rejected() {
    let (server, _state) = server_with_state().await;

    let response = server
        .post("/api/v1/claims/search")
        .json(&json!({ "protocol_source": 1 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn validator_outage_surfaces_as_error_status() {
    // Zero retry delay so the exhausted retry ladder costs no wall-clock time
    let config = ApiConfig {
        validation_retry_delay_secs: 0,
        ..ApiConfig::default()
    };
    let state = AppState::in_memory(&config);
    state
        .store
        .insert_claim(TestClaimBuilder::new().build())
        .await;
    let server = TestServer::new(create_router(state.clone())).unwrap();

    state
        .gateways
        .cnoua
        .fail_with(domain_validation::TransportError::Connection(
            "link down".into(),
        ));

    let response = server
        .post("/api/v1/authorizations")
        .json(&authorize_body("100.00"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "ERROR");
    assert_eq!(
        body["validation_results"][0]["status"]["kind"],
        "unavailable"
    );

    let health = server.get("/api/v1/validators/health").await.json::<Value>();
    assert_eq!(health["CNOUA"], false);
}

#[tokio::test]
async fn validators_health_and_routing_metadata_are_exposed() {
    let (server, _state) = server_with_state().await;

    let health = server.get("/api/v1/validators/health").await.json::<Value>();
    assert_eq!(health["CNOUA"], true);
    assert_eq!(health["SIPUA"], true);
    assert_eq!(health["SIMDA"], true);

    let routing = server
        .get("/api/v1/validators/routing")
        .await
        .json::<Value>();
    assert_eq!(routing["consortium_products"][0], 6814);
}
