//! Phase domain errors

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur in the phase lifecycle domain
#[derive(Debug, Error)]
pub enum PhaseError {
    #[error("Storage error: {0}")]
    Storage(#[from] PortError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
