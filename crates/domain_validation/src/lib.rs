//! External Validation Domain
//!
//! Every authorized payment is validated by exactly one of three external
//! systems, selected by product code and contract number:
//!
//! - **CNOUA** validates consortium products (codes 6814, 7701, 7709)
//! - **SIPUA** validates contracts with a contract number greater than zero
//! - **SIMDA** validates contracts with no contract number, or zero
//!
//! Each client wraps its transport in a timeout, a retry ladder, and a
//! process-wide circuit breaker. The [`router::ValidationRouter`] picks the
//! client, with product routing always winning over contract routing.

pub mod request;
pub mod response;
pub mod transport;
pub mod resilience;
pub mod client;
pub mod router;

pub use request::ValidationRequest;
pub use response::{ValidationResponse, ValidationStatus, RejectionReason, SUCCESS_CODE};
pub use transport::{ValidationTransport, RawValidationReply, TransportError};
pub use resilience::{
    ResiliencePolicy, ResilienceConfig, RetryConfig, CircuitBreaker, CircuitBreakerConfig,
    CallError,
};
pub use client::{
    ValidationClient, ExternalValidationClient, ValidationService, CONSORTIUM_PRODUCT_CODES,
};
pub use router::{ValidationRouter, ValidationRoute, RoutingInfo};
