//! Error types for the scan orchestrator.

use sentra_core::ScanId;
use sentra_store::{ScanStatus, StoreError};
use thiserror::Error;

/// Errors surfaced synchronously by orchestrator operations.
///
/// Pipeline failures are never raised here: they are recorded on the job
/// and observed via polling.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Submitted target is not a well-formed absolute http(s) URL
    #[error("{0}")]
    InvalidTarget(String),

    /// Operation referenced an unknown job id
    #[error("scan job not found: {0}")]
    NotFound(ScanId),

    /// Cancel attempted on a job that already finished
    #[error("scan job {id} is already terminal ({status})")]
    AlreadyTerminal {
        /// Job identifier
        id: ScanId,
        /// The terminal status the job is in
        status: ScanStatus,
    },

    /// Job store failure (snapshot I/O, serialization)
    #[error("job store error: {0}")]
    Store(StoreError),
}

impl ScanError {
    /// Lift store errors into orchestrator errors, preserving the
    /// not-found and already-terminal cases as first-class variants.
    pub(crate) fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::AlreadyTerminal { id, status } => Self::AlreadyTerminal { id, status },
            other => Self::Store(other),
        }
    }
}

/// Result type alias for orchestrator operations.
pub type Result<T> = std::result::Result<T, ScanError>;
