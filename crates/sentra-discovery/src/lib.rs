//! Sentra Discovery Module
//!
//! Attack-surface enumeration: finds the endpoints reachable on a scan
//! target by driving an external crawler behind a narrow adapter contract.

pub mod crawler;
pub mod error;

// Re-export main types
pub use crawler::{CrawlerConfig, CrawlerDiscovery};
pub use error::{DiscoveryError, Result};

use async_trait::async_trait;
use sentra_core::{Endpoint, ScanMode, TargetUrl};

/// Contract for the endpoint discovery stage.
///
/// Implementations must be thread-safe (`Send + Sync`) so the orchestrator
/// can share them across concurrently running scan jobs. An empty endpoint
/// list is a valid, non-error outcome.
#[async_trait]
pub trait EndpointDiscovery: Send + Sync {
    /// Enumerate endpoints reachable on `target`.
    ///
    /// # Errors
    /// Returns error if the underlying tool fails, is missing, or exceeds
    /// its adapter-local timeout.
    async fn discover(&self, target: &TargetUrl, mode: ScanMode) -> Result<Vec<Endpoint>>;
}
