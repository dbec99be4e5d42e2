//! In-memory claim and phase storage
//!
//! One [`MemoryStore`] owns every table. Authorization transactions stage
//! their writes against a working copy and apply them on commit while
//! holding the claim's single-writer lock; dropping a transaction discards
//! the staged state. Phase reads inside a transaction observe the staged
//! phase writes.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

use core_kernel::{ClaimKey, DomainPort, PortError, Protocol, TransactionOptions};
use domain_authorization::{AuthorizationStore, AuthorizationTransaction};
use domain_claims::{AccompanimentRecord, Claim, ClaimSearch, HistoryRecord};
use domain_phases::{
    ClaimPhase, PhaseAccess, PhaseEventRelationship, PhaseKey, PhaseStore, RelationshipSource,
};

#[derive(Default)]
struct Tables {
    claims: HashMap<ClaimKey, Claim>,
    history: Vec<HistoryRecord>,
    accompaniments: Vec<AccompanimentRecord>,
    phases: Vec<ClaimPhase>,
    relationships: Vec<PhaseEventRelationship>,
}

/// In-memory storage adapter for every port of the authorization pipeline
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    claim_locks: Arc<Mutex<HashMap<ClaimKey, Arc<Mutex<()>>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a claim
    pub async fn insert_claim(&self, claim: Claim) {
        self.tables.write().await.claims.insert(claim.key, claim);
    }

    /// Seeds a phase-event configuration row
    pub async fn insert_relationship(&self, relationship: PhaseEventRelationship) {
        self.tables.write().await.relationships.push(relationship);
    }

    /// Reads a claim without going through the authorization port
    pub async fn claim(&self, key: &ClaimKey) -> Option<Claim> {
        self.tables.read().await.claims.get(key).cloned()
    }

    /// Finds a claim by a validated search intent
    pub async fn find_claim(&self, search: &ClaimSearch) -> Option<Claim> {
        let tables = self.tables.read().await;
        tables
            .claims
            .values()
            .find(|claim| match search {
                ClaimSearch::Protocol(protocol) => claim.protocol == *protocol,
                ClaimSearch::ClaimNumber {
                    origin,
                    branch,
                    claim_number,
                } => {
                    claim.key.origin == *origin
                        && claim.key.branch == *branch
                        && claim.key.claim_number == *claim_number
                }
                ClaimSearch::Leader {
                    leader_code,
                    leader_claim_number,
                } => claim.leader.is_some_and(|leader| {
                    leader.leader_code == *leader_code
                        && leader.leader_claim_number == *leader_claim_number
                }),
            })
            .cloned()
    }

    /// History records of a claim, ordered by occurrence
    pub async fn history_for(&self, key: &ClaimKey) -> Vec<HistoryRecord> {
        let mut records: Vec<HistoryRecord> = self
            .tables
            .read()
            .await
            .history
            .iter()
            .filter(|h| h.claim_key == *key)
            .cloned()
            .collect();
        records.sort_by_key(|h| h.occurrence);
        records
    }

    /// Accompaniment records of a protocol, in insertion order
    pub async fn accompaniments_for(&self, protocol: Protocol) -> Vec<AccompanimentRecord> {
        self.tables
            .read()
            .await
            .accompaniments
            .iter()
            .filter(|a| a.protocol == protocol)
            .cloned()
            .collect()
    }

    async fn claim_lock(&self, key: &ClaimKey) -> Arc<Mutex<()>> {
        let mut locks = self.claim_locks.lock().await;
        locks
            .entry(*key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

impl DomainPort for MemoryStore {}

// ============================================================================
// Authorization store
// ============================================================================

#[async_trait]
impl AuthorizationStore for MemoryStore {
    async fn get_claim(&self, key: &ClaimKey) -> Result<Claim, PortError> {
        self.tables
            .read()
            .await
            .claims
            .get(key)
            .cloned()
            .ok_or_else(|| PortError::not_found("Claim", key))
    }

    async fn begin(
        &self,
        key: &ClaimKey,
        options: TransactionOptions,
    ) -> Result<Box<dyn AuthorizationTransaction>, PortError> {
        let lock = self.claim_lock(key).await;
        let guard = lock.lock_owned().await;

        let claim = self
            .tables
            .read()
            .await
            .claims
            .get(key)
            .cloned()
            .ok_or_else(|| PortError::not_found("Claim", key))?;

        debug!(claim = %key, isolation = ?options.isolation, "claim transaction begun");

        Ok(Box::new(MemoryTransaction {
            tables: Arc::clone(&self.tables),
            _claim_lock: guard,
            staged: StdMutex::new(Staged {
                claim,
                history: Vec::new(),
                accompaniments: Vec::new(),
                new_phases: Vec::new(),
                closed_phases: Vec::new(),
            }),
        }))
    }
}

struct Staged {
    claim: Claim,
    history: Vec<HistoryRecord>,
    accompaniments: Vec<AccompanimentRecord>,
    new_phases: Vec<ClaimPhase>,
    closed_phases: Vec<(PhaseKey, NaiveDate, String)>,
}

/// One staged transaction over a single claim
///
/// Holds the claim's lock for its whole lifetime. Commit applies the staged
/// writes; dropping without commit releases the lock and discards them.
pub struct MemoryTransaction {
    tables: Arc<RwLock<Tables>>,
    _claim_lock: OwnedMutexGuard<()>,
    staged: StdMutex<Staged>,
}

#[async_trait]
impl AuthorizationTransaction for MemoryTransaction {
    async fn claim(&self) -> Claim {
        self.staged.lock().expect("staged lock poisoned").claim.clone()
    }

    async fn allocate_occurrence(&self) -> Result<u32, PortError> {
        let mut staged = self.staged.lock().expect("staged lock poisoned");
        Ok(staged.claim.next_occurrence())
    }

    async fn apply_payment(&self, amount: core_kernel::Money) -> Result<(), PortError> {
        let mut staged = self.staged.lock().expect("staged lock poisoned");
        staged
            .claim
            .apply_payment(amount)
            .map_err(|err| PortError::conflict(err.to_string()))
    }

    async fn insert_history(&self, record: HistoryRecord) -> Result<(), PortError> {
        self.staged
            .lock()
            .expect("staged lock poisoned")
            .history
            .push(record);
        Ok(())
    }

    async fn insert_accompaniment(&self, record: AccompanimentRecord) -> Result<(), PortError> {
        self.staged
            .lock()
            .expect("staged lock poisoned")
            .accompaniments
            .push(record);
        Ok(())
    }

    fn as_phase_access(&self) -> &dyn PhaseAccess {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        let this = *self;
        let staged = this
            .staged
            .into_inner()
            .map_err(|_| PortError::internal("staged lock poisoned"))?;

        let mut tables = this.tables.write().await;
        tables.claims.insert(staged.claim.key, staged.claim);
        tables.history.extend(staged.history);
        tables.accompaniments.extend(staged.accompaniments);
        for (key, closed_on, closed_by) in staged.closed_phases {
            if let Some(phase) = tables.phases.iter_mut().find(|p| p.key() == key) {
                phase.close(closed_on, &closed_by);
            }
        }
        tables.phases.extend(staged.new_phases);
        Ok(())
    }
}

#[async_trait]
impl PhaseAccess for MemoryTransaction {
    async fn find_open(
        &self,
        protocol: Protocol,
        phase_code: u32,
        event_code: u32,
    ) -> Result<Option<ClaimPhase>, PortError> {
        let tables = self.tables.read().await;
        let staged = self.staged.lock().expect("staged lock poisoned");

        let matches = |p: &ClaimPhase| {
            p.protocol == protocol
                && p.phase_code == phase_code
                && p.event_code == event_code
                && p.is_open()
        };
        let staged_closed = |p: &ClaimPhase| {
            staged
                .closed_phases
                .iter()
                .any(|(key, _, _)| *key == p.key())
        };

        if let Some(phase) = staged.new_phases.iter().find(|p| matches(p)) {
            return Ok(Some(phase.clone()));
        }
        Ok(tables
            .phases
            .iter()
            .find(|p| matches(p) && !staged_closed(p))
            .cloned())
    }

    async fn insert_phase(&self, phase: ClaimPhase) -> Result<(), PortError> {
        self.staged
            .lock()
            .expect("staged lock poisoned")
            .new_phases
            .push(phase);
        Ok(())
    }

    async fn close_phase(
        &self,
        key: &PhaseKey,
        closed_on: NaiveDate,
        closed_by: &str,
    ) -> Result<(), PortError> {
        let mut staged = self.staged.lock().expect("staged lock poisoned");
        // A phase opened earlier in this same transaction closes in place
        if let Some(phase) = staged.new_phases.iter_mut().find(|p| p.key() == *key) {
            phase.close(closed_on, closed_by);
            return Ok(());
        }
        staged
            .closed_phases
            .push((*key, closed_on, closed_by.to_string()));
        Ok(())
    }
}

// ============================================================================
// Phase store (direct, non-transactional surface)
// ============================================================================

#[async_trait]
impl PhaseAccess for MemoryStore {
    async fn find_open(
        &self,
        protocol: Protocol,
        phase_code: u32,
        event_code: u32,
    ) -> Result<Option<ClaimPhase>, PortError> {
        Ok(self
            .tables
            .read()
            .await
            .phases
            .iter()
            .find(|p| {
                p.protocol == protocol
                    && p.phase_code == phase_code
                    && p.event_code == event_code
                    && p.is_open()
            })
            .cloned())
    }

    async fn insert_phase(&self, phase: ClaimPhase) -> Result<(), PortError> {
        self.tables.write().await.phases.push(phase);
        Ok(())
    }

    async fn close_phase(
        &self,
        key: &PhaseKey,
        closed_on: NaiveDate,
        closed_by: &str,
    ) -> Result<(), PortError> {
        let mut tables = self.tables.write().await;
        let phase = tables
            .phases
            .iter_mut()
            .find(|p| p.key() == *key)
            .ok_or_else(|| PortError::not_found("ClaimPhase", key.phase_code))?;
        phase.close(closed_on, closed_by);
        Ok(())
    }
}

#[async_trait]
impl PhaseStore for MemoryStore {
    async fn all_phases(&self, protocol: Protocol) -> Result<Vec<ClaimPhase>, PortError> {
        let mut phases: Vec<ClaimPhase> = self
            .tables
            .read()
            .await
            .phases
            .iter()
            .filter(|p| p.protocol == protocol)
            .cloned()
            .collect();
        phases.sort_by(|a, b| b.opened_on.cmp(&a.opened_on));
        Ok(phases)
    }

    async fn active_phases(&self, protocol: Protocol) -> Result<Vec<ClaimPhase>, PortError> {
        let mut phases: Vec<ClaimPhase> = self
            .tables
            .read()
            .await
            .phases
            .iter()
            .filter(|p| p.protocol == protocol && p.is_open())
            .cloned()
            .collect();
        phases.sort_by(|a, b| a.opened_on.cmp(&b.opened_on));
        Ok(phases)
    }

    fn as_access(&self) -> &dyn PhaseAccess {
        self
    }
}

#[async_trait]
impl RelationshipSource for MemoryStore {
    async fn relationships_for_event(
        &self,
        event_code: u32,
    ) -> Result<Vec<PhaseEventRelationship>, PortError> {
        Ok(self
            .tables
            .read()
            .await
            .relationships
            .iter()
            .filter(|r| r.event_code == event_code)
            .cloned()
            .collect())
    }
}
