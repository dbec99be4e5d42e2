//! Pre-built test data for common entities

use chrono::NaiveDate;

use core_kernel::{ClaimKey, Protocol};
use domain_phases::PhaseEventRelationship;

/// Standard identities used across the test suite
pub struct IdFixtures;

impl IdFixtures {
    pub fn claim_key() -> ClaimKey {
        ClaimKey::new(1, 10, 31, 123456)
    }

    pub fn protocol() -> Protocol {
        Protocol::new(1, 4231, 7)
    }
}

/// Standard dates used across the test suite
pub struct DateFixtures;

impl DateFixtures {
    /// The pinned business date
    pub fn business_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 14).expect("valid date")
    }

    /// A date safely before any configuration becomes effective
    pub fn before_configuration() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 1, 1).expect("valid date")
    }
}

/// Standard phase-event configuration rows
pub struct PhaseFixtures;

impl PhaseFixtures {
    /// Event 1098 opens phase 20 (payment settlement)
    pub fn settlement_opens_on_payment() -> PhaseEventRelationship {
        PhaseEventRelationship::opens(
            20,
            1098,
            NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date"),
        )
        .with_phase_name("Payment settlement")
    }
}
