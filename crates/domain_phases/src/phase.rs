//! Claim phase records

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use core_kernel::Protocol;

static OPEN_PHASE_SENTINEL: Lazy<NaiveDate> =
    Lazy::new(|| NaiveDate::from_ymd_opt(9999, 12, 31).expect("valid sentinel date"));

/// The far-future closing date that marks a phase as still open
pub fn open_phase_sentinel() -> NaiveDate {
    *OPEN_PHASE_SENTINEL
}

/// Full key of one phase instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhaseKey {
    pub protocol: Protocol,
    pub phase_code: u32,
    pub event_code: u32,
    pub occurrence: u32,
    pub effective_start: NaiveDate,
}

/// One phase instance of a protocol
///
/// A phase transitions Open -> Closed at most once. It is never reopened by
/// updating the same row; a later opening event creates a new instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimPhase {
    /// Protocol the phase belongs to
    pub protocol: Protocol,
    /// Phase code
    pub phase_code: u32,
    /// Event code that opened the phase
    pub event_code: u32,
    /// Occurrence number tying the phase to the accompaniment stream
    pub occurrence: u32,
    /// Effective-start date of the configuration row that produced the phase
    pub effective_start: NaiveDate,
    /// Opening date
    pub opened_on: NaiveDate,
    /// Closing date; the sentinel while the phase is open
    pub closed_on: NaiveDate,
    /// Display name from the configuration, when present
    pub phase_name: Option<String>,
    /// Operator who opened the phase
    pub opened_by: String,
    /// Operator who closed the phase
    pub closed_by: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl ClaimPhase {
    /// Creates a new open phase
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        protocol: Protocol,
        phase_code: u32,
        event_code: u32,
        occurrence: u32,
        effective_start: NaiveDate,
        opened_on: NaiveDate,
        phase_name: Option<String>,
        opened_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            protocol,
            phase_code,
            event_code,
            occurrence,
            effective_start,
            opened_on,
            closed_on: open_phase_sentinel(),
            phase_name,
            opened_by: opened_by.into(),
            closed_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The full key of this instance
    pub fn key(&self) -> PhaseKey {
        PhaseKey {
            protocol: self.protocol,
            phase_code: self.phase_code,
            event_code: self.event_code,
            occurrence: self.occurrence,
            effective_start: self.effective_start,
        }
    }

    /// Whether the phase is still open
    pub fn is_open(&self) -> bool {
        self.closed_on == open_phase_sentinel()
    }

    /// Closes the phase
    pub fn close(&mut self, closed_on: NaiveDate, closed_by: impl Into<String>) {
        self.closed_on = closed_on;
        self.closed_by = Some(closed_by.into());
        self.updated_at = Utc::now();
    }

    /// Whole days between opening and closing; None while open
    pub fn duration_days(&self) -> Option<i64> {
        if self.is_open() {
            return None;
        }
        Some((self.closed_on - self.opened_on).num_days())
    }

    /// Whole days the phase has been open as of the given date; 0 if closed
    pub fn days_open(&self, as_of: NaiveDate) -> i64 {
        if !self.is_open() {
            return 0;
        }
        (as_of - self.opened_on).num_days()
    }

    /// Display name for statistics and listings
    pub fn display_name(&self) -> String {
        self.phase_name
            .clone()
            .unwrap_or_else(|| format!("Phase {} / Event {}", self.phase_code, self.event_code))
    }
}
