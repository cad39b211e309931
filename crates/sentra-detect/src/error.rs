//! Error types for the detection stage.

use thiserror::Error;

/// Errors that can occur while detecting vulnerabilities.
#[derive(Debug, Error)]
pub enum DetectError {
    /// Scanner binary could not be found
    #[error("scanner binary '{binary}' not found in PATH")]
    ToolMissing {
        /// Configured binary name or path
        binary: String,
    },

    /// Scanner exited with a failure status
    #[error("scanner failed with status {status}: {stderr}")]
    ToolFailed {
        /// Exit status description
        status: String,
        /// Captured standard error output
        stderr: String,
    },

    /// Scanner exceeded the adapter-local timeout
    #[error("detection timed out after {seconds}s")]
    Timeout {
        /// Timeout duration in seconds
        seconds: u64,
    },

    /// I/O error while running the scanner
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for detection operations.
pub type Result<T> = std::result::Result<T, DetectError>;
