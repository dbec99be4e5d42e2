//! In-Memory Adapters
//!
//! Implements the storage, clock and rate ports against process memory, and
//! provides a rule-driven stand-in for the external validation gateway. The
//! store gives the authorization pipeline the same guarantees a database
//! adapter must: staged all-or-nothing transactions, and a single-writer
//! lock per claim that linearizes occurrence allocation and the balance
//! check.

pub mod store;
pub mod clock;
pub mod rates;
pub mod gateway;

pub use store::MemoryStore;
pub use clock::{FixedBusinessDate, SystemBusinessDate};
pub use rates::FixedRates;
pub use gateway::InMemoryValidationGateway;
