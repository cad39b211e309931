//! Error types for the discovery stage.

use thiserror::Error;

/// Errors that can occur while enumerating endpoints.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Crawler binary could not be found
    #[error("crawler binary '{binary}' not found in PATH")]
    ToolMissing {
        /// Configured binary name or path
        binary: String,
    },

    /// Crawler exited with a failure status
    #[error("crawler failed with status {status}: {stderr}")]
    ToolFailed {
        /// Exit status description
        status: String,
        /// Captured standard error output
        stderr: String,
    },

    /// Crawler exceeded the adapter-local timeout
    #[error("discovery timed out after {seconds}s")]
    Timeout {
        /// Timeout duration in seconds
        seconds: u64,
    },

    /// I/O error while running the crawler
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
