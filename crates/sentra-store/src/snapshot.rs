//! Durable JSON snapshot of the job map.
//!
//! The snapshot is a JSON array of job records, rewritten after every
//! mutation and reloaded at startup. Writes go to a sibling temp file
//! first and are renamed into place so a crash never leaves a truncated
//! snapshot behind.

use crate::error::Result;
use crate::jobs::ScanJob;
use std::path::Path;

/// Load all jobs from a snapshot file.
///
/// A missing file is not an error: it means no scans have run yet.
pub async fn load(path: &Path) -> Result<Vec<ScanJob>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no snapshot file, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let jobs: Vec<ScanJob> = serde_json::from_slice(&bytes)?;
    tracing::info!(count = jobs.len(), path = %path.display(), "loaded scan history");
    Ok(jobs)
}

/// Persist all jobs to the snapshot file.
pub async fn persist(path: &Path, jobs: &[ScanJob]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let bytes = serde_json::to_vec_pretty(jobs)?;
    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, &bytes).await?;
    tokio::fs::rename(&tmp_path, path).await?;

    tracing::debug!(count = jobs.len(), path = %path.display(), "snapshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentra_core::{ScanMode, TargetUrl};

    fn sample_job() -> ScanJob {
        let target = TargetUrl::parse("https://example.com").expect("valid target");
        ScanJob::new(target, ScanMode::Quick)
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_empty() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("scan_history.json");

        let jobs = load(&path).await.expect("load missing snapshot");
        assert!(jobs.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("scan_history.json");

        let jobs = vec![sample_job(), sample_job()];
        persist(&path, &jobs).await.expect("persist snapshot");

        let loaded = load(&path).await.expect("load snapshot");
        assert_eq!(loaded, jobs);
    }

    #[tokio::test]
    async fn test_persist_creates_parent_dirs() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("nested").join("deeper").join("history.json");

        persist(&path, &[sample_job()]).await.expect("persist snapshot");
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("scan_history.json");
        tokio::fs::write(&path, b"{not json")
            .await
            .expect("write corrupt file");

        assert!(load(&path).await.is_err());
    }
}
