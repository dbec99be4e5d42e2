//! Rule-driven stand-in for the external validation gateway
//!
//! Answers validation requests from configurable business rules instead of a
//! network call: useful for local runs, demos and tests. Failure injection
//! makes the resilience chain observable end to end.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use domain_validation::{
    RawValidationReply, TransportError, ValidationRequest, ValidationTransport,
};

/// In-process validation gateway with configurable rejection rules
#[derive(Debug, Default)]
pub struct InMemoryValidationGateway {
    cancelled_contracts: RwLock<HashSet<i64>>,
    fail_mode: RwLock<Option<TransportError>>,
    calls: AtomicU32,
}

impl InMemoryValidationGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a contract as cancelled; requests for it answer EZERT8002
    pub fn cancel_contract(&self, contract_number: i64) {
        self.cancelled_contracts
            .write()
            .expect("gateway lock poisoned")
            .insert(contract_number);
    }

    /// Makes every call (and probe) fail with the given transport error
    pub fn fail_with(&self, error: TransportError) {
        *self.fail_mode.write().expect("gateway lock poisoned") = Some(error);
    }

    /// Clears failure injection
    pub fn recover(&self) {
        *self.fail_mode.write().expect("gateway lock poisoned") = None;
    }

    /// How many validation calls reached this gateway
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ValidationTransport for InMemoryValidationGateway {
    async fn send(
        &self,
        request: &ValidationRequest,
    ) -> Result<RawValidationReply, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.fail_mode.read().expect("gateway lock poisoned").clone() {
            return Err(error);
        }

        if request
            .beneficiary
            .as_deref()
            .map_or(true, |name| name.trim().is_empty())
        {
            return Ok(RawValidationReply::with_code("EZERT8005"));
        }

        if let Some(contract) = request.contract_number {
            if self
                .cancelled_contracts
                .read()
                .expect("gateway lock poisoned")
                .contains(&contract)
            {
                return Ok(RawValidationReply::with_code("EZERT8002"));
            }
        }

        Ok(RawValidationReply::success())
    }

    async fn probe(&self) -> Result<(), TransportError> {
        match self.fail_mode.read().expect("gateway lock poisoned").clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
