//! Error types for the job store.

use crate::jobs::ScanStatus;
use sentra_core::ScanId;
use thiserror::Error;

/// Errors that can occur during job store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Operation referenced an unknown job id
    #[error("scan job not found: {0}")]
    NotFound(ScanId),

    /// Transition attempted on a job already in a terminal state
    #[error("scan job {id} is already terminal ({status})")]
    AlreadyTerminal {
        /// Job identifier
        id: ScanId,
        /// The terminal status the job is in
        status: ScanStatus,
    },

    /// I/O error reading or writing the snapshot
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot (de)serialization error
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
