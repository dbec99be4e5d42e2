//! Normalized responses from the external validation systems
//!
//! The wire protocol is an eight-character status code. Exactly one code
//! means success, five codes are named business rejections, and every other
//! code - including timeouts, parse failures and open-circuit rejections -
//! collapses to the generic service-unavailable rejection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single status code that means the validation passed
pub const SUCCESS_CODE: &str = "00000000";

/// Business rejection reasons, a closed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    InvalidConsortiumContract,
    ContractCancelled,
    GroupClosed,
    QuotaNotAwarded,
    BeneficiaryNotAuthorized,
}

impl RejectionReason {
    /// Short rejection code surfaced to callers
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::InvalidConsortiumContract => "CONS-001",
            RejectionReason::ContractCancelled => "CONS-002",
            RejectionReason::GroupClosed => "CONS-003",
            RejectionReason::QuotaNotAwarded => "CONS-004",
            RejectionReason::BeneficiaryNotAuthorized => "CONS-005",
        }
    }

    /// Human-readable rejection message
    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::InvalidConsortiumContract => "Invalid consortium contract",
            RejectionReason::ContractCancelled => "Consortium contract cancelled",
            RejectionReason::GroupClosed => "Consortium group closed",
            RejectionReason::QuotaNotAwarded => "Quota not awarded",
            RejectionReason::BeneficiaryNotAuthorized => "Beneficiary not authorized",
        }
    }
}

/// Normalized validation outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "reason")]
pub enum ValidationStatus {
    /// The validation passed
    Approved,
    /// The validation failed a business rule
    Rejected(RejectionReason),
    /// The validation system could not give an answer
    Unavailable,
}

impl ValidationStatus {
    /// Maps a raw status code onto the closed outcome set
    ///
    /// Unknown codes deliberately fall through to `Unavailable`; the code
    /// dictionary is fixed, not open-ended.
    pub fn from_code(code: &str) -> Self {
        match code {
            SUCCESS_CODE => ValidationStatus::Approved,
            "EZERT8001" => ValidationStatus::Rejected(RejectionReason::InvalidConsortiumContract),
            "EZERT8002" => ValidationStatus::Rejected(RejectionReason::ContractCancelled),
            "EZERT8003" => ValidationStatus::Rejected(RejectionReason::GroupClosed),
            "EZERT8004" => ValidationStatus::Rejected(RejectionReason::QuotaNotAwarded),
            "EZERT8005" => ValidationStatus::Rejected(RejectionReason::BeneficiaryNotAuthorized),
            _ => ValidationStatus::Unavailable,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, ValidationStatus::Approved)
    }

    /// Mapped message for non-success outcomes
    pub fn message(&self) -> Option<&'static str> {
        match self {
            ValidationStatus::Approved => None,
            ValidationStatus::Rejected(reason) => Some(reason.message()),
            ValidationStatus::Unavailable => Some("Validation service unavailable"),
        }
    }
}

/// Response from one validation call, normalized by the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResponse {
    /// Name of the serving system (CNOUA, SIPUA, SIMDA, or ROUTER)
    pub service: String,
    /// Raw status code as received (or a synthetic code for local failures)
    pub status_code: String,
    /// Normalized outcome
    pub status: ValidationStatus,
    /// Message accompanying the outcome
    pub message: Option<String>,
    /// When the request was sent
    pub requested_at: DateTime<Utc>,
    /// When the response was produced
    pub responded_at: DateTime<Utc>,
    /// Total elapsed time including retries
    pub elapsed_ms: u64,
}

impl ValidationResponse {
    /// Normalizes a raw reply code into a response
    pub fn from_code(
        service: impl Into<String>,
        status_code: impl Into<String>,
        message: Option<String>,
        requested_at: DateTime<Utc>,
        elapsed_ms: u64,
    ) -> Self {
        let status_code = status_code.into();
        let status = ValidationStatus::from_code(&status_code);
        let message = message.or_else(|| status.message().map(str::to_string));
        Self {
            service: service.into(),
            status_code,
            status,
            message,
            requested_at,
            responded_at: Utc::now(),
            elapsed_ms,
        }
    }

    /// Builds a service-unavailable response with a synthetic status code
    pub fn unavailable(
        service: impl Into<String>,
        status_code: impl Into<String>,
        message: impl Into<String>,
        requested_at: DateTime<Utc>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            service: service.into(),
            status_code: status_code.into(),
            status: ValidationStatus::Unavailable,
            message: Some(message.into()),
            requested_at,
            responded_at: Utc::now(),
            elapsed_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_approved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_code_maps_to_approved() {
        assert_eq!(
            ValidationStatus::from_code("00000000"),
            ValidationStatus::Approved
        );
    }

    #[test]
    fn test_business_codes_map_to_named_rejections() {
        let cases = [
            ("EZERT8001", RejectionReason::InvalidConsortiumContract),
            ("EZERT8002", RejectionReason::ContractCancelled),
            ("EZERT8003", RejectionReason::GroupClosed),
            ("EZERT8004", RejectionReason::QuotaNotAwarded),
            ("EZERT8005", RejectionReason::BeneficiaryNotAuthorized),
        ];
        for (code, reason) in cases {
            assert_eq!(
                ValidationStatus::from_code(code),
                ValidationStatus::Rejected(reason)
            );
        }
    }

    #[test]
    fn test_unknown_codes_collapse_to_unavailable() {
        for code in ["EZERT8099", "12345678", "garbage", ""] {
            assert_eq!(
                ValidationStatus::from_code(code),
                ValidationStatus::Unavailable
            );
        }
    }

    #[test]
    fn test_rejection_codes_are_stable() {
        assert_eq!(RejectionReason::InvalidConsortiumContract.code(), "CONS-001");
        assert_eq!(RejectionReason::BeneficiaryNotAuthorized.code(), "CONS-005");
    }

    #[test]
    fn test_from_code_fills_mapped_message() {
        let response =
            ValidationResponse::from_code("CNOUA", "EZERT8002", None, Utc::now(), 12);
        assert_eq!(
            response.message.as_deref(),
            Some("Consortium contract cancelled")
        );
        assert!(!response.is_success());
    }

    #[test]
    fn test_reply_message_wins_over_mapped_message() {
        let response = ValidationResponse::from_code(
            "CNOUA",
            "EZERT8002",
            Some("upstream detail".to_string()),
            Utc::now(),
            12,
        );
        assert_eq!(response.message.as_deref(), Some("upstream detail"));
    }
}
