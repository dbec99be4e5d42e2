//! Claims Domain
//!
//! This crate implements the claim aggregate and the records produced by a
//! payment authorization: the append-only history, the accompaniment event
//! stream, and the search intents used to locate a claim.
//!
//! A claim lives in the claim identity space ([`core_kernel::ClaimKey`]) and
//! carries its protocol ([`core_kernel::Protocol`]); history records join the
//! claim space, accompaniment records the protocol space.

pub mod claim;
pub mod history;
pub mod accompaniment;
pub mod search;
pub mod error;

pub use claim::{Claim, PolicyRef, LeaderRef};
pub use history::{
    HistoryRecord, StandardizedAmounts,
    PAYMENT_AUTHORIZATION_OPERATION, STANDARD_CORRECTION_TYPE,
};
pub use accompaniment::AccompanimentRecord;
pub use search::{ClaimSearch, SearchCriteria};
pub use error::ClaimError;
