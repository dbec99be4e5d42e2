//! Payment history records
//!
//! One append-only record per authorized payment, keyed by the claim identity
//! plus the occurrence number allocated from the claim's counter.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimKey, Money, Rate};

/// Fixed operation code of a payment authorization
pub const PAYMENT_AUTHORIZATION_OPERATION: u32 = 1098;

/// Fixed correction-type tag written on every authorization history record
pub const STANDARD_CORRECTION_TYPE: char = '5';

/// Amounts expressed in reference-currency units
///
/// Derived once at insert time from the standardization rate in force on the
/// business date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardizedAmounts {
    pub principal: Decimal,
    pub correction: Decimal,
    pub total: Decimal,
}

impl StandardizedAmounts {
    /// Standardizes principal and correction with the given rate
    pub fn from_rate(principal: &Money, correction: &Money, rate: Rate) -> Self {
        let principal = rate.standardize(principal.amount());
        let correction = rate.standardize(correction.amount());
        Self {
            principal,
            correction,
            total: principal + correction,
        }
    }
}

/// A payment authorization history record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Claim this record belongs to
    pub claim_key: ClaimKey,
    /// Occurrence sequence within the claim
    pub occurrence: u32,
    /// Operation code, always [`PAYMENT_AUTHORIZATION_OPERATION`]
    pub operation_code: u32,
    /// Business date of the movement
    pub movement_date: NaiveDate,
    /// Operation time
    pub operation_time: NaiveTime,
    /// Principal amount in the original currency
    pub principal: Money,
    /// Monetary correction amount in the original currency
    pub correction: Money,
    /// Correction type, always [`STANDARD_CORRECTION_TYPE`]
    pub correction_type: char,
    /// Beneficiary name; mandatory unless the claim's insurance type is 0
    pub beneficiary: Option<String>,
    /// Amounts in reference-currency units
    pub standardized: StandardizedAmounts,
    /// Accounting status, initialized '0'
    pub accounting_status: char,
    /// Overall status, initialized '0'
    pub overall_status: char,
    /// Operator who authorized the payment
    pub operator_id: String,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// Builds the history record for one authorized payment
    #[allow(clippy::too_many_arguments)]
    pub fn payment_authorization(
        claim_key: ClaimKey,
        occurrence: u32,
        movement_date: NaiveDate,
        operation_time: NaiveTime,
        principal: Money,
        correction: Money,
        beneficiary: Option<String>,
        rate: Rate,
        operator_id: impl Into<String>,
    ) -> Self {
        Self {
            claim_key,
            occurrence,
            operation_code: PAYMENT_AUTHORIZATION_OPERATION,
            movement_date,
            operation_time,
            principal,
            correction,
            correction_type: STANDARD_CORRECTION_TYPE,
            beneficiary,
            standardized: StandardizedAmounts::from_rate(&principal, &correction, rate),
            accounting_status: '0',
            overall_status: '0',
            operator_id: operator_id.into(),
            created_at: Utc::now(),
        }
    }

    /// Total authorized amount (principal plus correction)
    pub fn total(&self) -> Money {
        self.principal + self.correction
    }
}
