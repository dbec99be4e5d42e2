//! Standardization rate source

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{DomainPort, PortError, Rate};
use domain_authorization::StandardizationRates;

/// A single rate applied to every business date
#[derive(Debug, Clone, Copy)]
pub struct FixedRates {
    rate: Rate,
}

impl FixedRates {
    pub fn new(rate: Rate) -> Self {
        Self { rate }
    }

    /// Identity rate: standardized amounts equal original amounts
    pub fn unit() -> Self {
        Self { rate: Rate::unit() }
    }
}

impl DomainPort for FixedRates {}

#[async_trait]
impl StandardizationRates for FixedRates {
    async fn rate_for(&self, _date: NaiveDate) -> Result<Rate, PortError> {
        Ok(self.rate)
    }
}
