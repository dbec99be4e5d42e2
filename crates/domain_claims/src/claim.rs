//! Claim aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClaimError;
use core_kernel::{ClaimKey, Money, Protocol};

/// Reference to the policy a claim was raised against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRef {
    /// Policy origin
    pub origin: u32,
    /// Policy branch
    pub branch: u32,
    /// Policy number
    pub number: u32,
}

/// Reinsurance leader reference, present only on led claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderRef {
    /// Leader code
    pub leader_code: u32,
    /// Claim number under the leader
    pub leader_claim_number: u32,
}

/// A claim master record
///
/// The claim carries the running payment totals and the monotonically
/// increasing history-occurrence counter. Only the authorization pipeline
/// mutates it; it is never deleted by this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    /// Composite claim identity
    pub key: ClaimKey,
    /// Protocol under which phases and accompaniments are tracked
    pub protocol: Protocol,
    /// Policy reference
    pub policy: PolicyRef,
    /// Reinsurance leader, if any
    pub leader: Option<LeaderRef>,
    /// Product code, drives consortium routing
    pub product_code: u32,
    /// Expected reserve (total the claim is expected to pay out)
    pub expected_reserve: Money,
    /// Total paid so far
    pub total_paid: Money,
    /// History occurrence counter; the next history record takes counter + 1
    pub occurrence_counter: u32,
    /// Insurance type from the policy: 0 means the beneficiary is optional,
    /// anything else makes it mandatory
    pub policy_insurance_type: u32,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Pending balance still available for authorization
    pub fn pending(&self) -> Money {
        self.expected_reserve - self.total_paid
    }

    /// Whether a beneficiary name is mandatory on payments for this claim
    pub fn requires_beneficiary(&self) -> bool {
        self.policy_insurance_type != 0
    }

    /// Whether the pending balance covers the given amount
    pub fn can_cover(&self, amount: &Money) -> bool {
        self.pending().amount() >= amount.amount()
    }

    /// Applies an authorized payment to the running totals
    ///
    /// Fails when the amount exceeds the pending balance; the pending balance
    /// must never go negative.
    pub fn apply_payment(&mut self, amount: Money) -> Result<(), ClaimError> {
        if !self.can_cover(&amount) {
            return Err(ClaimError::InsufficientPending {
                requested: amount.amount(),
                pending: self.pending().amount(),
            });
        }
        self.total_paid = self.total_paid.checked_add(&amount)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Allocates the next history occurrence number
    ///
    /// Callers must hold the claim's single-writer lock; the storage adapter
    /// linearizes this through its transaction.
    pub fn next_occurrence(&mut self) -> u32 {
        self.occurrence_counter += 1;
        self.updated_at = Utc::now();
        self.occurrence_counter
    }
}
