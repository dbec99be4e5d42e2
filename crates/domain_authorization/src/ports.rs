//! Storage and rate ports for the authorization pipeline

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{ClaimKey, DomainPort, Money, PortError, Rate, TransactionOptions};
use domain_claims::{AccompanimentRecord, Claim, HistoryRecord};
use domain_phases::PhaseAccess;

/// Standardization-rate lookup for a business date
///
/// Consumed as an opaque rate; how the rate is produced is not this core's
/// concern.
#[async_trait]
pub trait StandardizationRates: DomainPort {
    async fn rate_for(&self, date: NaiveDate) -> Result<Rate, PortError>;
}

/// Storage surface of the authorization pipeline
#[async_trait]
pub trait AuthorizationStore: DomainPort {
    /// Reads a claim by its composite identity
    async fn get_claim(&self, key: &ClaimKey) -> Result<Claim, PortError>;

    /// Begins the multi-table transaction for one claim
    ///
    /// The transaction holds the claim's single-writer lock until it commits
    /// or is dropped, linearizing occurrence allocation and the balance
    /// check across concurrent authorizations of the same claim. Different
    /// claims are never serialized against each other.
    async fn begin(
        &self,
        key: &ClaimKey,
        options: TransactionOptions,
    ) -> Result<Box<dyn AuthorizationTransaction>, PortError>;
}

/// One all-or-nothing authorization transaction
///
/// Writes are staged; nothing is visible outside the transaction until
/// [`AuthorizationTransaction::commit`]. Dropping the transaction without
/// committing discards every staged write.
#[async_trait]
pub trait AuthorizationTransaction: Send + Sync {
    /// Current view of the claim, including writes staged in this transaction
    async fn claim(&self) -> Claim;

    /// Allocates the next history occurrence number
    async fn allocate_occurrence(&self) -> Result<u32, PortError>;

    /// Adds the authorized amount to the claim's running totals
    async fn apply_payment(&self, amount: Money) -> Result<(), PortError>;

    /// Stages the history record insert
    async fn insert_history(&self, record: HistoryRecord) -> Result<(), PortError>;

    /// Stages the accompaniment record insert
    async fn insert_accompaniment(&self, record: AccompanimentRecord) -> Result<(), PortError>;

    /// Phase view of this transaction; reads observe staged phase writes
    fn as_phase_access(&self) -> &dyn PhaseAccess;

    /// Atomically applies every staged write
    async fn commit(self: Box<Self>) -> Result<(), PortError>;
}
