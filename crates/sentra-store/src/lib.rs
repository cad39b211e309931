//! Sentra Job Store
//!
//! Holds every scan job the orchestrator knows about. The in-memory map is
//! the single source of truth; a durable JSON snapshot is rewritten after
//! every mutation and reloaded at startup.
//!
//! # Concurrency model
//!
//! - One writer per job: the job's own pipeline task, going through the
//!   transition methods here.
//! - Arbitrarily many concurrent readers: status polls, list, delete.
//! - Reads return cloned job values, so a poller can never observe a
//!   half-updated job.
//! - Transition methods refuse to leave a terminal state; a job's status
//!   never regresses.
//!
//! # Example
//!
//! ```ignore
//! use sentra_store::{JobStore, ScanJob};
//!
//! let store = JobStore::open("scan_history.json".into()).await?;
//! store.insert(job).await?;
//! store.mark_running(&id).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod jobs;
pub mod snapshot;

// Re-export commonly used types
pub use error::{Result, StoreError};
pub use jobs::{ScanJob, ScanStatus};

use chrono::Utc;
use sentra_core::{ScanId, ScanResult};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::{Mutex, RwLock};

/// Job store: in-memory map plus durable snapshot.
#[derive(Debug)]
pub struct JobStore {
    jobs: RwLock<HashMap<ScanId, ScanJob>>,
    snapshot_path: Option<PathBuf>,
    // Serializes snapshot writes from concurrently finishing jobs
    snapshot_lock: Mutex<()>,
}

impl JobStore {
    /// Create a store without durable snapshots (tests, ephemeral use).
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            snapshot_path: None,
            snapshot_lock: Mutex::new(()),
        }
    }

    /// Open a store backed by the given snapshot file.
    ///
    /// Loads any existing snapshot; a missing file starts the store empty.
    ///
    /// # Errors
    /// Returns error if an existing snapshot cannot be read or parsed.
    pub async fn open(snapshot_path: PathBuf) -> Result<Self> {
        let loaded = snapshot::load(&snapshot_path).await?;
        let jobs = loaded.into_iter().map(|job| (job.id.clone(), job)).collect();

        Ok(Self {
            jobs: RwLock::new(jobs),
            snapshot_path: Some(snapshot_path),
            snapshot_lock: Mutex::new(()),
        })
    }

    /// Insert a newly created job.
    pub async fn insert(&self, job: ScanJob) -> Result<()> {
        let snapshot = {
            let mut jobs = self.jobs.write().await;
            jobs.insert(job.id.clone(), job);
            self.collect_for_snapshot(&jobs)
        };
        self.persist(snapshot).await
    }

    /// Get a cloned snapshot of a job.
    pub async fn get(&self, id: &ScanId) -> Option<ScanJob> {
        self.jobs.read().await.get(id).cloned()
    }

    /// All known jobs, most recently submitted first.
    pub async fn list(&self) -> Vec<ScanJob> {
        let jobs = self.jobs.read().await;
        let mut all: Vec<ScanJob> = jobs.values().cloned().collect();
        all.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        all
    }

    /// Remove a job unconditionally, regardless of status.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if the job is unknown.
    pub async fn remove(&self, id: &ScanId) -> Result<ScanJob> {
        let (removed, snapshot) = {
            let mut jobs = self.jobs.write().await;
            let removed = jobs
                .remove(id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            (removed, self.collect_for_snapshot(&jobs))
        };
        self.persist(snapshot).await?;
        Ok(removed)
    }

    /// Transition a job to `Running` and stamp `started_at`.
    pub async fn mark_running(&self, id: &ScanId) -> Result<()> {
        self.transition(id, |job| {
            job.status = ScanStatus::Running;
            job.started_at = Some(Utc::now());
        })
        .await
    }

    /// Transition a job to `Completed` and attach its result.
    pub async fn mark_completed(&self, id: &ScanId, result: ScanResult) -> Result<()> {
        self.transition(id, |job| {
            job.status = ScanStatus::Completed;
            job.finished_at = Some(Utc::now());
            job.result = Some(result);
        })
        .await
    }

    /// Transition a job to `Failed` and record the cause.
    pub async fn mark_failed(&self, id: &ScanId, error: impl Into<String>) -> Result<()> {
        let error = error.into();
        self.transition(id, |job| {
            job.status = ScanStatus::Failed;
            job.finished_at = Some(Utc::now());
            job.error = Some(error);
        })
        .await
    }

    /// Transition a job to `Cancelled`.
    pub async fn mark_cancelled(&self, id: &ScanId) -> Result<()> {
        self.transition(id, |job| {
            job.status = ScanStatus::Cancelled;
            job.finished_at = Some(Utc::now());
        })
        .await
    }

    /// Apply a transition under the write lock.
    ///
    /// The job value is mutated in place and becomes visible to readers
    /// atomically when the lock drops; terminal states are never left.
    async fn transition(
        &self,
        id: &ScanId,
        apply: impl FnOnce(&mut ScanJob),
    ) -> Result<()> {
        let snapshot = {
            let mut jobs = self.jobs.write().await;
            let job = jobs
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            if job.status.is_terminal() {
                return Err(StoreError::AlreadyTerminal {
                    id: id.clone(),
                    status: job.status,
                });
            }
            apply(job);
            self.collect_for_snapshot(&jobs)
        };
        self.persist(snapshot).await
    }

    /// Clone the job map for snapshotting, but only when a snapshot path
    /// is configured.
    fn collect_for_snapshot(&self, jobs: &HashMap<ScanId, ScanJob>) -> Option<Vec<ScanJob>> {
        self.snapshot_path
            .as_ref()
            .map(|_| jobs.values().cloned().collect())
    }

    /// Write the snapshot file, serializing concurrent writers.
    async fn persist(&self, jobs: Option<Vec<ScanJob>>) -> Result<()> {
        let (Some(path), Some(jobs)) = (&self.snapshot_path, jobs) else {
            return Ok(());
        };

        let _guard = self.snapshot_lock.lock().await;
        snapshot::persist(path, &jobs).await
    }
}
