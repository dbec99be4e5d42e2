//! Storage ports for the phase domain

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{DomainPort, PortError, Protocol};

use crate::phase::{ClaimPhase, PhaseKey};
use crate::relationship::PhaseEventRelationship;

/// Mutating view of the phase table
///
/// Implemented both by the plain store and by the authorization transaction,
/// so the engine's mutations can run either standalone or inside the
/// all-or-nothing payment pipeline. Implementations use interior mutability;
/// reads must observe writes staged earlier in the same view.
#[async_trait]
pub trait PhaseAccess: Send + Sync {
    /// Finds the open phase instance for (protocol, phase, event), if any
    async fn find_open(
        &self,
        protocol: Protocol,
        phase_code: u32,
        event_code: u32,
    ) -> Result<Option<ClaimPhase>, PortError>;

    /// Inserts a new phase instance
    async fn insert_phase(&self, phase: ClaimPhase) -> Result<(), PortError>;

    /// Closes the phase instance identified by the key
    async fn close_phase(
        &self,
        key: &PhaseKey,
        closed_on: NaiveDate,
        closed_by: &str,
    ) -> Result<(), PortError>;
}

/// Query and mutation surface of the phase table
#[async_trait]
pub trait PhaseStore: PhaseAccess + DomainPort {
    /// All phases of a protocol, ordered by opening date descending
    async fn all_phases(&self, protocol: Protocol) -> Result<Vec<ClaimPhase>, PortError>;

    /// Open phases of a protocol, ordered by opening date ascending
    async fn active_phases(&self, protocol: Protocol) -> Result<Vec<ClaimPhase>, PortError>;

    /// The store as a plain mutating view
    fn as_access(&self) -> &dyn PhaseAccess;
}

/// Lookup of phase-event configuration rows
#[async_trait]
pub trait RelationshipSource: DomainPort {
    /// All configuration rows for the event code, regardless of window
    ///
    /// The engine applies the effective-window and active filters itself.
    async fn relationships_for_event(
        &self,
        event_code: u32,
    ) -> Result<Vec<PhaseEventRelationship>, PortError>;
}
