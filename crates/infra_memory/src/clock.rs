//! Business date sources

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};

use core_kernel::{BusinessDateSource, DomainPort, PortError};

/// Business date taken from the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBusinessDate;

impl DomainPort for SystemBusinessDate {}

#[async_trait]
impl BusinessDateSource for SystemBusinessDate {
    async fn business_date(&self) -> Result<NaiveDate, PortError> {
        Ok(Utc::now().date_naive())
    }
}

/// A pinned business date, for tests and batch reprocessing
#[derive(Debug, Clone, Copy)]
pub struct FixedBusinessDate {
    date: NaiveDate,
    time: NaiveTime,
}

impl FixedBusinessDate {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            time: NaiveTime::from_hms_opt(12, 0, 0).expect("valid time"),
        }
    }

    pub fn at(mut self, time: NaiveTime) -> Self {
        self.time = time;
        self
    }
}

impl DomainPort for FixedBusinessDate {}

#[async_trait]
impl BusinessDateSource for FixedBusinessDate {
    async fn business_date(&self) -> Result<NaiveDate, PortError> {
        Ok(self.date)
    }

    fn operation_time(&self) -> NaiveTime {
        self.time
    }
}
