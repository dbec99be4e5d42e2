//! Request handlers

pub mod authorizations;
pub mod claims;
pub mod phases;
pub mod health;
