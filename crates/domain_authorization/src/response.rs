//! Authorization responses

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{AuthorizationId, ClaimKey};
use domain_validation::{ValidationResponse, ValidationRoute};

use crate::request::AuthorizationRequest;

/// Final status of one authorization attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthorizationStatus {
    Approved,
    Rejected,
    /// Waiting on manual review; the only cancellable status
    Pending,
    Error,
    Cancelled,
}

/// Result of one authorization attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationResponse {
    /// Identifier of the attempt
    pub authorization_id: AuthorizationId,
    /// Outcome
    pub status: AuthorizationStatus,
    /// Claim the payment was authorized against
    pub claim_key: ClaimKey,
    /// Amount authorized; zero unless approved
    pub authorized_amount: Decimal,
    /// History occurrence allocated for the payment, when approved
    pub occurrence: Option<u32>,
    /// Responses from the external validation systems consulted
    pub validation_results: Vec<ValidationResponse>,
    /// Errors explaining a non-approved outcome
    pub errors: Vec<String>,
    /// Non-fatal notes
    pub warnings: Vec<String>,
    /// When the outcome was produced
    pub authorized_at: DateTime<Utc>,
}

impl AuthorizationResponse {
    /// An approved outcome
    pub fn approved(
        authorization_id: AuthorizationId,
        request: &AuthorizationRequest,
        occurrence: u32,
        validation_results: Vec<ValidationResponse>,
    ) -> Self {
        Self {
            authorization_id,
            status: AuthorizationStatus::Approved,
            claim_key: request.claim_key,
            authorized_amount: request.amount,
            occurrence: Some(occurrence),
            validation_results,
            errors: Vec::new(),
            warnings: Vec::new(),
            authorized_at: Utc::now(),
        }
    }

    /// A rejected outcome (business rule or validation rejection)
    pub fn rejected(
        authorization_id: AuthorizationId,
        request: &AuthorizationRequest,
        errors: Vec<String>,
        validation_results: Vec<ValidationResponse>,
    ) -> Self {
        Self {
            authorization_id,
            status: AuthorizationStatus::Rejected,
            claim_key: request.claim_key,
            authorized_amount: Decimal::ZERO,
            occurrence: None,
            validation_results,
            errors,
            warnings: Vec::new(),
            authorized_at: Utc::now(),
        }
    }

    /// A processing-error outcome
    pub fn error(
        authorization_id: AuthorizationId,
        request: &AuthorizationRequest,
        errors: Vec<String>,
        validation_results: Vec<ValidationResponse>,
    ) -> Self {
        Self {
            authorization_id,
            status: AuthorizationStatus::Error,
            claim_key: request.claim_key,
            authorized_amount: Decimal::ZERO,
            occurrence: None,
            validation_results,
            errors,
            warnings: Vec::new(),
            authorized_at: Utc::now(),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == AuthorizationStatus::Approved
    }
}

/// Result of a dry-run validation (no persistence, no phase updates)
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Whether the request passes all local preconditions
    pub valid: bool,
    /// Precondition violations, empty when valid
    pub errors: Vec<String>,
    /// Which external system would be consulted
    pub required_service: ValidationRoute,
}
