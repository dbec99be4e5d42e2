//! Core Kernel - Foundational types for the claims authorization system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Composite identities for the claim and protocol identity spaces
//! - Port infrastructure shared by storage and external-system adapters

pub mod money;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use money::{Money, Currency, Rate, MoneyError};
pub use identifiers::{ClaimKey, Protocol, AuthorizationId};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, BusinessDateSource,
    IsolationLevel, TransactionOptions,
};
