//! Phase Lifecycle Domain
//!
//! Claim processing is tracked as a set of phases per protocol. A
//! time-versioned configuration relation says which business events open or
//! close which phases; the lifecycle engine materializes those transitions,
//! preventing duplicate opens and computing phase statistics.
//!
//! Phases live in the protocol identity space and never reference the claim
//! tables structurally.

pub mod phase;
pub mod relationship;
pub mod ports;
pub mod engine;
pub mod error;

pub use phase::{ClaimPhase, PhaseKey, open_phase_sentinel};
pub use relationship::{PhaseEventRelationship, PhaseTransition};
pub use ports::{PhaseAccess, PhaseStore, RelationshipSource};
pub use engine::{PhaseLifecycleEngine, PhaseStatistics, PhaseUpdateSummary};
pub use error::PhaseError;
