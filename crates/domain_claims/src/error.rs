//! Claims domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::MoneyError;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Claim not found: {0}")]
    ClaimNotFound(String),

    #[error("Payment of {requested} exceeds pending balance of {pending}")]
    InsufficientPending { requested: Decimal, pending: Decimal },

    #[error("Invalid search criteria: {0}")]
    InvalidSearchCriteria(String),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}
