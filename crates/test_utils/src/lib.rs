//! Test Utilities Crate
//!
//! Shared fixtures and data builders for the claims authorization test
//! suite. Builders come with sensible defaults so tests only specify the
//! fields they care about.

pub mod fixtures;
pub mod builders;

pub use fixtures::*;
pub use builders::*;
