//! Scan orchestrator: job submission and pipeline execution.
//!
//! The orchestrator owns the public scan operations (submit, status,
//! cancel, delete, list) and drives each job through the fixed pipeline
//! Discover → Detect → Prioritize → Interpret on its own tokio task.
//! Every lifecycle transition goes through the job store, so pollers
//! always read consistent job snapshots.

use crate::error::{Result, ScanError};
use crate::prioritize::prioritize;
use sentra_core::{
    Finding, Interpretation, ScanId, ScanMode, ScanResult, ScanSummary, SentraError, TargetUrl,
};
use sentra_detect::VulnerabilityDetection;
use sentra_discovery::EndpointDiscovery;
use sentra_llm::FindingInterpreter;
use sentra_store::{JobStore, ScanJob, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Default cap on findings kept after prioritization.
const DEFAULT_MAX_FINDINGS: usize = 10;

/// Cancellation handle for a job whose pipeline runs in this process.
#[derive(Clone)]
struct JobHandle {
    cancel: CancellationToken,
}

/// Orchestrates scan jobs across their full lifecycle.
///
/// Collaborators are injected as shared trait objects, so tests can swap
/// in doubles for the external tools and the LLM service.
#[derive(Clone)]
pub struct ScanOrchestrator {
    /// Single source of truth for job state
    store: Arc<JobStore>,
    /// Discover stage adapter
    discovery: Arc<dyn EndpointDiscovery>,
    /// Detect stage adapter
    detector: Arc<dyn VulnerabilityDetection>,
    /// Interpret stage adapter
    interpreter: Arc<dyn FindingInterpreter>,
    /// Findings cap passed to the prioritization engine
    max_findings: usize,
    /// Cancellation handles for pipelines running in this process
    tasks: Arc<RwLock<HashMap<ScanId, JobHandle>>>,
}

impl ScanOrchestrator {
    /// Create a new orchestrator.
    #[must_use]
    pub fn new(
        store: Arc<JobStore>,
        discovery: Arc<dyn EndpointDiscovery>,
        detector: Arc<dyn VulnerabilityDetection>,
        interpreter: Arc<dyn FindingInterpreter>,
    ) -> Self {
        Self {
            store,
            discovery,
            detector,
            interpreter,
            max_findings: DEFAULT_MAX_FINDINGS,
            tasks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Set the cap on findings kept after prioritization.
    #[must_use]
    pub fn with_max_findings(mut self, max: usize) -> Self {
        self.max_findings = max;
        self
    }

    /// Submit a new scan and return its job id immediately.
    ///
    /// Target validation is the only synchronous check; the pipeline runs
    /// on its own task and is observed via [`Self::status`]. The job is
    /// already `Running` by the time this returns, so a poller never sees
    /// `Pending` for a launched scan.
    ///
    /// # Errors
    /// Returns `ScanError::InvalidTarget` if `target` is not an absolute
    /// http(s) URL.
    pub async fn submit(&self, target: &str, mode: ScanMode) -> Result<ScanId> {
        let target = TargetUrl::parse(target).map_err(|e| match e {
            SentraError::Validation(msg) => ScanError::InvalidTarget(msg),
            other => ScanError::InvalidTarget(other.to_string()),
        })?;

        let job = ScanJob::new(target.clone(), mode);
        let id = job.id.clone();

        self.store
            .insert(job)
            .await
            .map_err(ScanError::from_store)?;
        self.store
            .mark_running(&id)
            .await
            .map_err(ScanError::from_store)?;

        let token = CancellationToken::new();
        self.tasks.write().await.insert(
            id.clone(),
            JobHandle {
                cancel: token.clone(),
            },
        );

        let worker = self.clone();
        let task_id = id.clone();
        tokio::spawn(async move {
            worker.run_pipeline(&task_id, &target, mode, &token).await;
            worker.tasks.write().await.remove(&task_id);
        });

        tracing::info!(scan_id = %id, %mode, "scan submitted");
        Ok(id)
    }

    /// Get a consistent snapshot of a job.
    ///
    /// # Errors
    /// Returns `ScanError::NotFound` for unknown ids.
    pub async fn status(&self, id: &ScanId) -> Result<ScanJob> {
        self.store
            .get(id)
            .await
            .ok_or_else(|| ScanError::NotFound(id.clone()))
    }

    /// All known jobs, most recently submitted first.
    pub async fn list(&self) -> Vec<ScanJob> {
        self.store.list().await
    }

    /// Request cooperative cancellation of a running job.
    ///
    /// The pipeline honors the request at its next checkpoint; a stage
    /// already in flight runs to completion or its own timeout first.
    ///
    /// # Errors
    /// Returns `ScanError::NotFound` for unknown ids and
    /// `ScanError::AlreadyTerminal` for jobs that already finished.
    pub async fn cancel(&self, id: &ScanId) -> Result<()> {
        let job = self.status(id).await?;
        if job.status.is_terminal() {
            return Err(ScanError::AlreadyTerminal {
                id: id.clone(),
                status: job.status,
            });
        }

        let handle = self.tasks.read().await.get(id).cloned();
        match handle {
            Some(handle) => {
                handle.cancel.cancel();
                tracing::info!(scan_id = %id, "cancellation requested");
                Ok(())
            }
            None => {
                // No pipeline in this process (job reloaded from a
                // snapshot); there is no writer to race with, so the
                // transition runs directly.
                self.store
                    .mark_cancelled(id)
                    .await
                    .map_err(ScanError::from_store)?;
                tracing::info!(scan_id = %id, "orphaned job cancelled");
                Ok(())
            }
        }
    }

    /// Remove a job from the store, regardless of status.
    ///
    /// A running pipeline is not stopped; its remaining transitions find
    /// no job and are dropped, orphaning the result.
    ///
    /// # Errors
    /// Returns `ScanError::NotFound` for unknown ids.
    pub async fn delete(&self, id: &ScanId) -> Result<()> {
        self.store.remove(id).await.map_err(ScanError::from_store)?;
        self.tasks.write().await.remove(id);
        tracing::info!(scan_id = %id, "scan deleted");
        Ok(())
    }

    /// Drive one job through the pipeline.
    ///
    /// Never returns an error: every outcome is recorded on the job.
    /// Cancellation is checked before each stage and before each
    /// per-finding interpretation call.
    async fn run_pipeline(
        &self,
        id: &ScanId,
        target: &TargetUrl,
        mode: ScanMode,
        cancel: &CancellationToken,
    ) {
        let started = Instant::now();

        if cancel.is_cancelled() {
            self.finish_cancelled(id).await;
            return;
        }

        let endpoints = match self.discovery.discover(target, mode).await {
            Ok(endpoints) => endpoints,
            Err(e) => {
                tracing::warn!(scan_id = %id, error = %e, "discovery stage failed");
                self.finish_failed(id, format!("discovery failed: {e}")).await;
                return;
            }
        };
        let total_endpoints = endpoints.len();
        let params_found = endpoints.iter().filter(|e| e.has_params).count();

        if cancel.is_cancelled() {
            self.finish_cancelled(id).await;
            return;
        }

        // No reachable surface: a valid empty outcome, not a failure
        if endpoints.is_empty() {
            tracing::info!(scan_id = %id, "no endpoints discovered, completing empty");
            let result = ScanResult {
                summary: ScanSummary {
                    target: target.to_string(),
                    total_endpoints: 0,
                    raw_findings_count: 0,
                    top_issues_count: 0,
                    params_found: 0,
                    duration_seconds: started.elapsed().as_secs_f64(),
                },
                findings: Vec::new(),
            };
            self.finish_completed(id, result).await;
            return;
        }

        let raw_findings = match self.detector.detect(&endpoints, mode).await {
            Ok(findings) => findings,
            Err(e) => {
                tracing::warn!(scan_id = %id, error = %e, "detection stage failed");
                self.finish_failed(id, format!("detection failed: {e}")).await;
                return;
            }
        };
        let raw_findings_count = raw_findings.len();

        if cancel.is_cancelled() {
            self.finish_cancelled(id).await;
            return;
        }

        let ranked = prioritize(raw_findings, self.max_findings);
        tracing::info!(
            scan_id = %id,
            raw = raw_findings_count,
            kept = ranked.len(),
            "prioritization complete"
        );

        let mut findings = Vec::with_capacity(ranked.len());
        for scored in ranked {
            if cancel.is_cancelled() {
                self.finish_cancelled(id).await;
                return;
            }

            let interpretation = match self.interpreter.interpret(&scored.raw).await {
                Ok(interpretation) => interpretation,
                Err(e) => {
                    // Interpretation is an enhancement; one bad finding
                    // must not sink the scan
                    tracing::warn!(
                        scan_id = %id,
                        finding = %scored.raw.name,
                        error = %e,
                        "interpretation degraded to placeholder"
                    );
                    Interpretation::placeholder(&scored.raw)
                }
            };

            findings.push(Finding {
                name: scored.raw.name,
                title: scored.raw.title,
                url: scored.raw.url,
                severity: scored.raw.severity,
                score: scored.score,
                interpretation,
            });
        }

        let result = ScanResult {
            summary: ScanSummary {
                target: target.to_string(),
                total_endpoints,
                raw_findings_count,
                top_issues_count: findings.len(),
                params_found,
                duration_seconds: started.elapsed().as_secs_f64(),
            },
            findings,
        };
        self.finish_completed(id, result).await;
        tracing::info!(scan_id = %id, "scan completed");
    }

    /// Record a completed outcome.
    async fn finish_completed(&self, id: &ScanId, result: ScanResult) {
        let outcome = self.store.mark_completed(id, result).await;
        Self::log_transition_outcome(id, outcome);
    }

    /// Record a failed outcome.
    async fn finish_failed(&self, id: &ScanId, error: String) {
        let outcome = self.store.mark_failed(id, error).await;
        Self::log_transition_outcome(id, outcome);
    }

    /// Record a cancelled outcome.
    async fn finish_cancelled(&self, id: &ScanId) {
        let outcome = self.store.mark_cancelled(id).await;
        Self::log_transition_outcome(id, outcome);
        tracing::info!(scan_id = %id, "scan cancelled");
    }

    /// A terminal transition can only fail if the job was deleted out
    /// from under the pipeline, or if the snapshot write failed.
    fn log_transition_outcome(id: &ScanId, outcome: sentra_store::Result<()>) {
        match outcome {
            Ok(()) => {}
            Err(StoreError::NotFound(_)) => {
                tracing::debug!(scan_id = %id, "job deleted while pipeline was running");
            }
            Err(e) => {
                tracing::error!(scan_id = %id, error = %e, "failed to record job transition");
            }
        }
    }
}
