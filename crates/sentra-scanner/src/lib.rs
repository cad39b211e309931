//! Sentra Scanner - Scan job orchestration.
//!
//! This crate drives security scans end to end: it creates scan jobs,
//! executes each one on an independent task through the fixed pipeline
//! Discover → Detect → Prioritize → Interpret, tracks lifecycle state in
//! the job store, and honors cooperative cancellation at stage boundaries.
//!
//! # Features
//!
//! - One independent pipeline task per job, unbounded concurrency
//! - Cooperative cancellation checked before each stage and before each
//!   per-finding interpretation call
//! - Deterministic finding prioritization with deduplication and a cap
//! - Graceful degradation: a failed interpretation falls back to a
//!   placeholder explanation instead of failing the scan
//!
//! # Example
//!
//! ```rust,ignore
//! use sentra_scanner::ScanOrchestrator;
//! use sentra_core::ScanMode;
//! use std::sync::Arc;
//!
//! let orchestrator = ScanOrchestrator::new(store, discovery, detector, interpreter);
//!
//! let scan_id = orchestrator.submit("https://example.com", ScanMode::Quick).await?;
//! loop {
//!     let job = orchestrator.status(&scan_id).await?;
//!     if job.status.is_terminal() {
//!         break;
//!     }
//!     tokio::time::sleep(std::time::Duration::from_secs(2)).await;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod orchestrator;
pub mod prioritize;

// Re-export commonly used types
pub use error::{Result, ScanError};
pub use orchestrator::ScanOrchestrator;
pub use prioritize::{prioritize, ScoredFinding};
