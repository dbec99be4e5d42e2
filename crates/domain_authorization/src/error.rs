//! Authorization domain errors

use thiserror::Error;

use core_kernel::{AuthorizationId, PortError};
use domain_phases::PhaseError;

/// Errors that can occur in the authorization domain
#[derive(Debug, Error)]
pub enum AuthorizationError {
    #[error("Claim not found: {0}")]
    ClaimNotFound(String),

    #[error("Authorization not found: {0}")]
    AuthorizationNotFound(AuthorizationId),

    #[error("Invalid transaction step: {0}")]
    InvalidStep(String),

    #[error("Storage error: {0}")]
    Storage(#[from] PortError),

    #[error("Phase error: {0}")]
    Phase(#[from] PhaseError),
}
