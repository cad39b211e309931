//! Sentra Core - Foundation crate for the Sentra scan orchestrator.
//!
//! This crate provides the shared domain model, error handling, and
//! configuration management that all other Sentra crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared domain types (`ScanId`, `TargetUrl`, `Severity`,
//!   `RawFinding`, `ScanResult`, ...)
//!
//! # Example
//!
//! ```rust
//! use sentra_core::{ScanMode, Severity, TargetUrl};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let target = TargetUrl::parse("https://example.com")?;
//! assert_eq!(target.as_str(), "https://example.com/");
//! assert!(Severity::Critical > Severity::High);
//! assert_eq!(ScanMode::default(), ScanMode::Quick);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, DetectionConfig, DiscoveryConfig, LlmConfig, ScanningConfig, StoreConfig,
};
pub use error::{ConfigError, ConfigResult, Result, SentraError};
pub use types::{
    Endpoint, Finding, Interpretation, RawFinding, ScanId, ScanMode, ScanResult, ScanSummary,
    Severity, TargetUrl,
};
