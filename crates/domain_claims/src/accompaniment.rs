//! Accompaniment event records
//!
//! The accompaniment stream tracks workflow events against the protocol
//! identity, not the claim identity.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::Protocol;

/// A workflow event appended during claim processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccompanimentRecord {
    /// Protocol the event belongs to
    pub protocol: Protocol,
    /// Business event code (1098 for payment authorization)
    pub event_code: u32,
    /// Business date of the event
    pub event_date: NaiveDate,
    /// Occurrence number within the protocol's event stream
    pub occurrence: u32,
    /// Time of the event
    pub event_time: NaiveTime,
    /// Complementary description
    pub description: Option<String>,
    /// Operator who triggered the event
    pub operator_id: String,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl AccompanimentRecord {
    pub fn new(
        protocol: Protocol,
        event_code: u32,
        event_date: NaiveDate,
        occurrence: u32,
        event_time: NaiveTime,
        operator_id: impl Into<String>,
    ) -> Self {
        Self {
            protocol,
            event_code,
            event_date,
            occurrence,
            event_time,
            description: None,
            operator_id: operator_id.into(),
            created_at: Utc::now(),
        }
    }

    /// Sets the complementary description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
