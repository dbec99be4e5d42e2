//! Transport seam for the external validation systems
//!
//! The domain never talks to the network directly; it goes through
//! [`ValidationTransport`], which adapters implement (HTTP gateway in
//! production, scripted stand-ins in tests). The resilience policies sit on
//! top of this seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::request::ValidationRequest;
use crate::response::SUCCESS_CODE;

/// Raw reply from a validation system before normalization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawValidationReply {
    /// Eight-character status code
    pub code: String,
    /// Optional message from the remote system
    pub message: Option<String>,
}

impl RawValidationReply {
    pub fn success() -> Self {
        Self {
            code: SUCCESS_CODE.to_string(),
            message: None,
        }
    }

    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

/// Failures of the transport itself, as opposed to business rejections
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("server error: HTTP {status}")]
    Server { status: u16 },

    #[error("rate limited by remote system")]
    RateLimited,

    #[error("malformed reply: {0}")]
    Protocol(String),
}

impl TransportError {
    /// Whether the retry policy may try this failure again
    ///
    /// Only transport drops, 5xx-class server failures and rate limiting are
    /// retryable; a malformed reply will not improve on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Connection(_) => true,
            TransportError::Server { status } => (500..=599).contains(status),
            TransportError::RateLimited => true,
            TransportError::Protocol(_) => false,
        }
    }
}

/// One synchronous call to a single external validation system
#[async_trait]
pub trait ValidationTransport: Send + Sync + 'static {
    /// Sends the validation request and returns the raw reply
    async fn send(&self, request: &ValidationRequest) -> Result<RawValidationReply, TransportError>;

    /// Lightweight connectivity probe used by health checks
    async fn probe(&self) -> Result<(), TransportError>;
}
