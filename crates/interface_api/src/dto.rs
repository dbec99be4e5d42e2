//! Request/Response data transfer objects

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::ClaimKey;
use domain_authorization::AuthorizationRequest;
use domain_claims::Claim;
use domain_phases::ClaimPhase;

fn default_true() -> bool {
    true
}

/// Payment authorization request body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AuthorizePaymentRequest {
    /// Insurance type component of the claim key
    pub insurance_type: u32,
    /// Claim origin (01-99)
    #[validate(range(min = 1, max = 99))]
    pub origin: u32,
    /// Claim branch (00-99)
    #[validate(range(max = 99))]
    pub branch: u32,
    /// Claim number (1-999999)
    #[validate(range(min = 1, max = 999_999))]
    pub claim_number: u32,
    /// Payment type (1-5)
    #[validate(range(min = 1, max = 5))]
    pub payment_type: u8,
    /// Principal amount
    pub amount: Decimal,
    /// Monetary correction amount
    #[serde(default)]
    pub correction_amount: Decimal,
    /// Beneficiary name
    #[validate(length(max = 100))]
    pub beneficiary: Option<String>,
    /// Contract number from the housing-contract lookup
    pub contract_number: Option<i64>,
    /// Operator executing the authorization
    #[validate(length(min = 1, max = 20))]
    pub operator_id: String,
    /// Whether the external validation gate applies
    #[serde(default = "default_true")]
    pub external_validation: bool,
}

impl From<AuthorizePaymentRequest> for AuthorizationRequest {
    fn from(dto: AuthorizePaymentRequest) -> Self {
        AuthorizationRequest {
            claim_key: ClaimKey::new(
                dto.insurance_type,
                dto.origin,
                dto.branch,
                dto.claim_number,
            ),
            payment_type: dto.payment_type,
            amount: dto.amount,
            correction_amount: dto.correction_amount,
            beneficiary: dto.beneficiary,
            contract_number: dto.contract_number,
            operator_id: dto.operator_id,
            external_validation: dto.external_validation,
        }
    }
}

/// Cancellation request body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CancelAuthorizationRequest {
    #[validate(length(min = 1, max = 20))]
    pub cancelled_by: String,
    #[validate(length(min = 1, max = 200))]
    pub reason: String,
}

/// Cancellation outcome
#[derive(Debug, Clone, Serialize)]
pub struct CancelAuthorizationResponse {
    pub cancelled: bool,
}

/// Claim representation returned by the search endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ClaimResponse {
    pub insurance_type: u32,
    pub origin: u32,
    pub branch: u32,
    pub claim_number: u32,
    pub protocol_source: u32,
    pub protocol_number: u32,
    pub check_digit: u32,
    pub product_code: u32,
    pub expected_reserve: Decimal,
    pub total_paid: Decimal,
    pub pending: Decimal,
    pub occurrence_counter: u32,
    pub policy_insurance_type: u32,
}

impl From<Claim> for ClaimResponse {
    fn from(claim: Claim) -> Self {
        Self {
            insurance_type: claim.key.insurance_type,
            origin: claim.key.origin,
            branch: claim.key.branch,
            claim_number: claim.key.claim_number,
            protocol_source: claim.protocol.source,
            protocol_number: claim.protocol.number,
            check_digit: claim.protocol.check_digit,
            product_code: claim.product_code,
            expected_reserve: claim.expected_reserve.amount(),
            total_paid: claim.total_paid.amount(),
            pending: claim.pending().amount(),
            occurrence_counter: claim.occurrence_counter,
            policy_insurance_type: claim.policy_insurance_type,
        }
    }
}

/// Phase representation returned by the phase endpoints
#[derive(Debug, Clone, Serialize)]
pub struct PhaseResponse {
    pub phase_code: u32,
    pub event_code: u32,
    pub name: String,
    pub opened_on: NaiveDate,
    pub closed_on: NaiveDate,
    pub is_open: bool,
    pub duration_days: Option<i64>,
}

impl From<ClaimPhase> for PhaseResponse {
    fn from(phase: ClaimPhase) -> Self {
        Self {
            phase_code: phase.phase_code,
            event_code: phase.event_code,
            name: phase.display_name(),
            opened_on: phase.opened_on,
            closed_on: phase.closed_on,
            is_open: phase.is_open(),
            duration_days: phase.duration_days(),
        }
    }
}
