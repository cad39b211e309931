//! Sentra Detect Module
//!
//! Vulnerability detection: inspects discovered endpoints by driving an
//! external template scanner behind a narrow adapter contract, and maps
//! the tool's noisy output into typed findings with scoring inputs
//! (severity, ease of fix, confidence) attached.

pub mod error;
pub mod parser;
pub mod template;

// Re-export main types
pub use error::{DetectError, Result};
pub use parser::parse_findings;
pub use template::{DetectorConfig, TemplateDetector};

use async_trait::async_trait;
use sentra_core::{Endpoint, RawFinding, ScanMode};

/// Contract for the vulnerability detection stage.
///
/// Implementations must be thread-safe (`Send + Sync`) so the orchestrator
/// can share them across concurrently running scan jobs. An empty finding
/// list is a valid, non-error outcome.
#[async_trait]
pub trait VulnerabilityDetection: Send + Sync {
    /// Inspect the given endpoints for vulnerabilities.
    ///
    /// # Errors
    /// Returns error if the underlying tool fails, is missing, or exceeds
    /// its adapter-local timeout.
    async fn detect(&self, endpoints: &[Endpoint], mode: ScanMode) -> Result<Vec<RawFinding>>;
}
