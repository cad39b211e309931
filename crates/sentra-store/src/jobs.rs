//! Scan job model and lifecycle states.

use chrono::{DateTime, Utc};
use sentra_core::{ScanId, ScanMode, ScanResult, TargetUrl};
use serde::{Deserialize, Serialize};

/// Status of a scan job.
///
/// `Pending → Running → {Completed | Failed | Cancelled}`; the three
/// terminal states are never left.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// Created, pipeline not yet started
    Pending,
    /// Pipeline is executing
    Running,
    /// Finished with a result attached
    Completed,
    /// Finished with an error recorded
    Failed,
    /// Cancelled at a cooperative checkpoint
    Cancelled,
}

impl ScanStatus {
    /// Whether this status admits no further transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A scan job: lifecycle state plus accumulated results.
///
/// Mutated only through the store's transition methods, called by the
/// job's own pipeline task; every other component reads cloned snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanJob {
    /// Unique identifier, generated at creation
    pub id: ScanId,
    /// Validated scan target
    pub target: TargetUrl,
    /// Scan mode selected at submission
    pub mode: ScanMode,
    /// Current lifecycle status
    pub status: ScanStatus,
    /// When the job was submitted
    pub submitted_at: DateTime<Utc>,
    /// When the pipeline started executing
    pub started_at: Option<DateTime<Utc>>,
    /// When the job reached a terminal state
    pub finished_at: Option<DateTime<Utc>>,
    /// Final result; populated only on `Completed`
    pub result: Option<ScanResult>,
    /// Failure cause; populated only on `Failed`
    pub error: Option<String>,
}

impl ScanJob {
    /// Create a new pending job for the given target.
    #[must_use]
    pub fn new(target: TargetUrl, mode: ScanMode) -> Self {
        Self {
            id: ScanId::generate(),
            target,
            mode,
            status: ScanStatus::Pending,
            submitted_at: Utc::now(),
            started_at: None,
            finished_at: None,
            result: None,
            error: None,
        }
    }
}
