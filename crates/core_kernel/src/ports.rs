//! Ports and Adapters Infrastructure
//!
//! Port traits are defined in each domain and depend only on this module for
//! the shared error type and transaction options. Adapters (in-memory,
//! database, external API) implement those traits without the domains knowing
//! which one is wired in.

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for port operations
///
/// Provides a unified error type that all port implementations must use,
/// ensuring consistent error handling across adapters.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// A validation error occurred
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The operation conflicts with existing data
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// The operation timed out
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout { operation: String, duration_ms: u64 },

    /// The external system is unavailable
    #[error("Service unavailable: {service}")]
    ServiceUnavailable { service: String },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. }
                | PortError::Timeout { .. }
                | PortError::ServiceUnavailable { .. }
        )
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// All port traits should extend this marker to ensure they are
/// thread-safe and can be used in async contexts.
pub trait DomainPort: Send + Sync + 'static {}

/// Transaction isolation level requested from the storage adapter
///
/// The authorization pipeline requires at least ReadCommitted to prevent
/// lost updates on the claim totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl Default for IsolationLevel {
    fn default() -> Self {
        IsolationLevel::ReadCommitted
    }
}

/// Options for beginning a storage transaction
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionOptions {
    pub isolation: IsolationLevel,
}

impl TransactionOptions {
    pub fn with_isolation(isolation: IsolationLevel) -> Self {
        Self { isolation }
    }
}

/// Source of the single business date used to stamp every record written by
/// one authorization attempt
#[async_trait::async_trait]
pub trait BusinessDateSource: DomainPort {
    /// Returns the current business date
    async fn business_date(&self) -> Result<NaiveDate, PortError>;

    /// Returns the wall-clock operation time used for record stamping
    fn operation_time(&self) -> NaiveTime {
        Utc::now().time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_not_found() {
        let error = PortError::not_found("Claim", "1/10/31/123456");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert!(error.to_string().contains("Claim"));
    }

    #[test]
    fn test_port_error_transient() {
        let timeout = PortError::Timeout {
            operation: "validate".to_string(),
            duration_ms: 10_000,
        };
        assert!(timeout.is_transient());

        let validation = PortError::validation("invalid amount");
        assert!(!validation.is_transient());
    }

    #[test]
    fn test_default_isolation_is_read_committed() {
        assert_eq!(
            TransactionOptions::default().isolation,
            IsolationLevel::ReadCommitted
        );
    }
}
