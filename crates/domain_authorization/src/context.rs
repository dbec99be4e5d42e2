//! Transaction context for the authorization pipeline
//!
//! The context tracks one authorization attempt through its storage steps.
//! Steps only move forward; a rollback reason may be recorded at any step
//! but must be absent once the context reaches Committed.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{AuthorizationId, ClaimKey};
use domain_claims::{PAYMENT_AUTHORIZATION_OPERATION, STANDARD_CORRECTION_TYPE};

use crate::error::AuthorizationError;

/// Pipeline step of one authorization attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStep {
    /// Insert the history record
    History,
    /// Update the claim master totals
    ClaimMaster,
    /// Insert the accompaniment event
    Accompaniment,
    /// Apply the phase transitions
    Phases,
    /// All writes committed
    Committed,
}

impl fmt::Display for TransactionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionStep::History => "History",
            TransactionStep::ClaimMaster => "ClaimMaster",
            TransactionStep::Accompaniment => "Accompaniment",
            TransactionStep::Phases => "Phases",
            TransactionStep::Committed => "Committed",
        };
        write!(f, "{name}")
    }
}

/// Ephemeral state of one authorization attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionContext {
    /// Identifier of this attempt
    pub authorization_id: AuthorizationId,
    /// Claim being paid
    pub claim_key: ClaimKey,
    /// Operator executing the authorization
    pub operator_id: String,
    /// Business date stamped on every record of this attempt
    pub transaction_date: NaiveDate,
    /// Operation time stamped on every record of this attempt
    pub transaction_time: NaiveTime,
    /// Fixed operation code (1098)
    pub operation_code: u32,
    /// Fixed correction type ('5')
    pub correction_type: char,
    /// Current pipeline step
    pub step: TransactionStep,
    /// Why the attempt rolled back, when it did
    pub rollback_reason: Option<String>,
    /// When the attempt started
    pub started_at: DateTime<Utc>,
}

impl TransactionContext {
    pub fn new(
        authorization_id: AuthorizationId,
        claim_key: ClaimKey,
        operator_id: impl Into<String>,
        transaction_date: NaiveDate,
        transaction_time: NaiveTime,
    ) -> Self {
        Self {
            authorization_id,
            claim_key,
            operator_id: operator_id.into(),
            transaction_date,
            transaction_time,
            operation_code: PAYMENT_AUTHORIZATION_OPERATION,
            correction_type: STANDARD_CORRECTION_TYPE,
            step: TransactionStep::History,
            rollback_reason: None,
            started_at: Utc::now(),
        }
    }

    /// Moves to the next step; steps never move backwards
    pub fn advance(&mut self) -> Result<TransactionStep, AuthorizationError> {
        self.step = match self.step {
            TransactionStep::History => TransactionStep::ClaimMaster,
            TransactionStep::ClaimMaster => TransactionStep::Accompaniment,
            TransactionStep::Accompaniment => TransactionStep::Phases,
            TransactionStep::Phases => TransactionStep::Committed,
            TransactionStep::Committed => {
                return Err(AuthorizationError::InvalidStep(
                    "cannot advance past Committed".to_string(),
                ))
            }
        };
        Ok(self.step)
    }

    /// Records the rollback reason
    pub fn mark_rollback(&mut self, reason: impl Into<String>) {
        self.rollback_reason = Some(reason.into());
    }

    /// Validates the context invariants
    pub fn is_valid(&self) -> bool {
        if self.operator_id.trim().is_empty() {
            return false;
        }
        if self.operation_code != PAYMENT_AUTHORIZATION_OPERATION {
            return false;
        }
        if self.correction_type != STANDARD_CORRECTION_TYPE {
            return false;
        }
        // A committed context must not carry a rollback reason
        !(self.step == TransactionStep::Committed && self.rollback_reason.is_some())
    }

    /// Milliseconds since the attempt started
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }
}
