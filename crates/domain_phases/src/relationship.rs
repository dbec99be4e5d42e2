//! Phase-event relationship configuration
//!
//! Time-versioned rows saying which phases a business event opens or closes.
//! Only the row whose effective window contains the event date is applied.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What the event does to the phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseTransition {
    Opens,
    Closes,
}

/// One configuration row, keyed by (phase, event, effective-start)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseEventRelationship {
    /// Phase code
    pub phase_code: u32,
    /// Event code
    pub event_code: u32,
    /// Effective start (inclusive)
    pub effective_start: NaiveDate,
    /// Effective end (inclusive), None means unbounded
    pub effective_end: Option<NaiveDate>,
    /// Whether the event opens or closes the phase
    pub transition: PhaseTransition,
    /// Display name of the phase
    pub phase_name: Option<String>,
    /// Display name of the event
    pub event_name: Option<String>,
    /// Inactive rows are never applied
    pub active: bool,
}

impl PhaseEventRelationship {
    /// A row configuring the event to open the phase
    pub fn opens(phase_code: u32, event_code: u32, effective_start: NaiveDate) -> Self {
        Self {
            phase_code,
            event_code,
            effective_start,
            effective_end: None,
            transition: PhaseTransition::Opens,
            phase_name: None,
            event_name: None,
            active: true,
        }
    }

    /// A row configuring the event to close the phase
    pub fn closes(phase_code: u32, event_code: u32, effective_start: NaiveDate) -> Self {
        Self {
            phase_code,
            event_code,
            effective_start,
            effective_end: None,
            transition: PhaseTransition::Closes,
            phase_name: None,
            event_name: None,
            active: true,
        }
    }

    /// Sets the phase display name
    pub fn with_phase_name(mut self, name: impl Into<String>) -> Self {
        self.phase_name = Some(name.into());
        self
    }

    /// Sets the effective end date
    pub fn until(mut self, effective_end: NaiveDate) -> Self {
        self.effective_end = Some(effective_end);
        self
    }

    /// Marks the row inactive
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Whether this row applies to an event on the given date
    pub fn is_in_force(&self, date: NaiveDate) -> bool {
        if date < self.effective_start {
            return false;
        }
        if let Some(end) = self.effective_end {
            if date > end {
                return false;
            }
        }
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_not_in_force_before_effective_start() {
        let rel = PhaseEventRelationship::opens(20, 1098, date(2024, 1, 1));
        assert!(!rel.is_in_force(date(2023, 12, 31)));
        assert!(rel.is_in_force(date(2024, 1, 1)));
        assert!(rel.is_in_force(date(2030, 6, 1)));
    }

    #[test]
    fn test_effective_end_bounds_the_window() {
        let rel =
            PhaseEventRelationship::opens(20, 1098, date(2024, 1, 1)).until(date(2024, 12, 31));
        assert!(rel.is_in_force(date(2024, 12, 31)));
        assert!(!rel.is_in_force(date(2025, 1, 1)));
    }

    #[test]
    fn test_inactive_row_is_never_in_force() {
        let rel = PhaseEventRelationship::opens(20, 1098, date(2024, 1, 1)).inactive();
        assert!(!rel.is_in_force(date(2024, 6, 1)));
    }
}
