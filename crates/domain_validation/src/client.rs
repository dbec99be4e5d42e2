//! Resilient clients for the three external validation systems
//!
//! The three systems share one wire contract and one policy chain; they
//! differ only in which requests they claim ([`ValidationService::supports`])
//! and in the endpoint behind the transport. One client type therefore
//! serves all three, instantiated once per system with its own long-lived
//! policy state.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::request::ValidationRequest;
use crate::resilience::ResiliencePolicy;
use crate::response::ValidationResponse;
use crate::transport::{TransportError, ValidationTransport};

/// Product codes routed to the consortium validator regardless of contract
pub const CONSORTIUM_PRODUCT_CODES: [u32; 3] = [6814, 7701, 7709];

/// The three external validation systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationService {
    /// Consortium product validation
    Cnoua,
    /// Contract validation for contracts with a number greater than zero
    Sipua,
    /// Contract validation for contracts without a number, or zero
    Simda,
}

impl ValidationService {
    /// Wire name of the system
    pub fn name(&self) -> &'static str {
        match self {
            ValidationService::Cnoua => "CNOUA",
            ValidationService::Sipua => "SIPUA",
            ValidationService::Simda => "SIMDA",
        }
    }

    /// Whether this system claims the given product/contract combination
    pub fn supports(&self, product_code: u32, contract_number: Option<i64>) -> bool {
        match self {
            ValidationService::Cnoua => CONSORTIUM_PRODUCT_CODES.contains(&product_code),
            ValidationService::Sipua => contract_number.is_some_and(|n| n > 0),
            ValidationService::Simda => contract_number.unwrap_or(0) == 0,
        }
    }
}

/// One external validation system as seen by the router
#[async_trait]
pub trait ValidationClient: Send + Sync {
    /// Which system this client fronts
    fn service(&self) -> ValidationService;

    /// Routing eligibility predicate
    fn supports(&self, product_code: u32, contract_number: Option<i64>) -> bool;

    /// Validates one payment; all failures normalize into the response
    async fn validate(&self, request: &ValidationRequest) -> ValidationResponse;

    /// Health probe; errors bubble up so the router can report per client
    async fn is_healthy(&self) -> Result<bool, TransportError>;
}

/// Transport-backed client wrapped in the resilience policy chain
#[derive(Debug)]
pub struct ExternalValidationClient<T: ValidationTransport> {
    service: ValidationService,
    transport: Arc<T>,
    policy: Arc<ResiliencePolicy>,
}

impl<T: ValidationTransport> ExternalValidationClient<T> {
    /// Creates a client for one system
    ///
    /// The policy must be created once per system and reused; it owns the
    /// process-wide circuit breaker state.
    pub fn new(service: ValidationService, transport: Arc<T>, policy: Arc<ResiliencePolicy>) -> Self {
        Self {
            service,
            transport,
            policy,
        }
    }
}

#[async_trait]
impl<T: ValidationTransport> ValidationClient for ExternalValidationClient<T> {
    fn service(&self) -> ValidationService {
        self.service
    }

    fn supports(&self, product_code: u32, contract_number: Option<i64>) -> bool {
        self.service.supports(product_code, contract_number)
    }

    async fn validate(&self, request: &ValidationRequest) -> ValidationResponse {
        let requested_at = Utc::now();
        let started = Instant::now();
        let service = self.service.name();

        if !self.supports(request.product_code, request.contract_number) {
            warn!(
                service,
                product = request.product_code,
                contract = ?request.contract_number,
                "request failed routing eligibility, no call made"
            );
            return ValidationResponse::unavailable(
                service,
                "UNSUPPORTED",
                format!(
                    "Request for product {} is not supported by {}",
                    request.product_code, service
                ),
                requested_at,
                0,
            );
        }

        let transport = Arc::clone(&self.transport);
        let call_request = request.clone();
        let result = self
            .policy
            .execute(move || {
                let transport = Arc::clone(&transport);
                let request = call_request.clone();
                async move { transport.send(&request).await }
            })
            .await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let response = match result {
            Ok(reply) => ValidationResponse::from_code(
                service,
                reply.code,
                reply.message,
                requested_at,
                elapsed_ms,
            ),
            Err(error) => ValidationResponse::unavailable(
                service,
                error.status_code(),
                error.to_string(),
                requested_at,
                elapsed_ms,
            ),
        };

        info!(
            service,
            claim = %request.claim_key,
            status_code = %response.status_code,
            elapsed_ms,
            "external validation completed"
        );
        response
    }

    async fn is_healthy(&self) -> Result<bool, TransportError> {
        if self.policy.breaker().is_open() {
            return Ok(false);
        }
        self.transport.probe().await.map(|_| true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cnoua_supports_consortium_products_only() {
        for product in CONSORTIUM_PRODUCT_CODES {
            assert!(ValidationService::Cnoua.supports(product, None));
            assert!(ValidationService::Cnoua.supports(product, Some(500)));
        }
        assert!(!ValidationService::Cnoua.supports(1234, Some(500)));
    }

    #[test]
    fn test_sipua_supports_positive_contracts() {
        assert!(ValidationService::Sipua.supports(1234, Some(1)));
        assert!(ValidationService::Sipua.supports(6814, Some(500)));
        assert!(!ValidationService::Sipua.supports(1234, Some(0)));
        assert!(!ValidationService::Sipua.supports(1234, None));
    }

    #[test]
    fn test_simda_supports_absent_or_zero_contracts() {
        assert!(ValidationService::Simda.supports(1234, None));
        assert!(ValidationService::Simda.supports(1234, Some(0)));
        assert!(!ValidationService::Simda.supports(1234, Some(7)));
    }
}
