//! Local precondition rules
//!
//! Checked before any external call or storage write. A violation rejects
//! the request outright; nothing is retried and no transaction context is
//! created.

use rust_decimal::Decimal;
use thiserror::Error;

use domain_claims::Claim;

use crate::request::AuthorizationRequest;

/// A business rule the request failed before any I/O
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionViolation {
    #[error("Payment amount must be greater than zero")]
    AmountNotPositive,

    #[error("Payment amount must have at most 2 decimal places")]
    AmountPrecisionExceeded,

    #[error("Payment type must be between 1 and 5, got {0}")]
    InvalidPaymentType(u8),

    #[error("Beneficiary name is required for this claim's insurance type")]
    BeneficiaryRequired,

    #[error("Payment of {requested} exceeds pending balance of {pending}")]
    ExceedsPendingBalance { requested: Decimal, pending: Decimal },

    #[error("Operator id is required")]
    OperatorMissing,
}

/// Checks every precondition and returns all violations found
pub fn check(request: &AuthorizationRequest, claim: &Claim) -> Vec<PreconditionViolation> {
    let mut violations = Vec::new();

    if request.amount <= Decimal::ZERO {
        violations.push(PreconditionViolation::AmountNotPositive);
    } else if request.amount != request.amount.round_dp(2) {
        violations.push(PreconditionViolation::AmountPrecisionExceeded);
    }

    if !(1..=5).contains(&request.payment_type) {
        violations.push(PreconditionViolation::InvalidPaymentType(
            request.payment_type,
        ));
    }

    if claim.requires_beneficiary()
        && request
            .beneficiary
            .as_deref()
            .map_or(true, |name| name.trim().is_empty())
    {
        violations.push(PreconditionViolation::BeneficiaryRequired);
    }

    let pending = claim.pending().amount();
    if request.amount > Decimal::ZERO && request.amount > pending {
        violations.push(PreconditionViolation::ExceedsPendingBalance {
            requested: request.amount,
            pending,
        });
    }

    if request.operator_id.trim().is_empty() {
        violations.push(PreconditionViolation::OperatorMissing);
    }

    violations
}
