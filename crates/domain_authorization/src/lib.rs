//! Payment Authorization Domain
//!
//! The orchestrator drives the whole authorization of one payment: local
//! precondition rules, the single external validation call through the
//! router, and the four-step storage pipeline (history, claim master,
//! accompaniment, phases) that commits or rolls back as one unit while a
//! [`context::TransactionContext`] tracks progress.

pub mod context;
pub mod request;
pub mod response;
pub mod preconditions;
pub mod ports;
pub mod orchestrator;
pub mod error;

pub use context::{TransactionContext, TransactionStep};
pub use request::AuthorizationRequest;
pub use response::{AuthorizationResponse, AuthorizationStatus, ValidationReport};
pub use preconditions::PreconditionViolation;
pub use ports::{AuthorizationStore, AuthorizationTransaction, StandardizationRates};
pub use orchestrator::AuthorizationOrchestrator;
pub use error::AuthorizationError;
