//! Subprocess-backed template scanner adapter.
//!
//! Writes the discovered endpoints to a temporary list file, drives an
//! external template scanner (nuclei-compatible CLI) over it, and parses
//! the output into raw findings.

use crate::error::{DetectError, Result};
use crate::parser::parse_findings;
use crate::VulnerabilityDetection;
use async_trait::async_trait;
use sentra_core::config::DetectionConfig;
use sentra_core::{Endpoint, RawFinding, ScanMode};
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

/// Severity levels requested from the scanner.
const SEVERITY_LEVELS: &str = "info,low,medium,high,critical";

/// Configuration for the template scanner subprocess.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Scanner binary name or path
    pub binary: String,
    /// Optional template directory override
    pub templates_dir: Option<PathBuf>,
    /// Requests per second limit
    pub rate_limit: u32,
    /// Per-request timeout passed to the scanner
    pub request_timeout: Duration,
    /// Adapter-local timeout for the whole detection stage
    pub timeout: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::from(&DetectionConfig::default())
    }
}

impl From<&DetectionConfig> for DetectorConfig {
    fn from(config: &DetectionConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            templates_dir: config.templates_dir.clone(),
            rate_limit: config.rate_limit,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Vulnerability detection backed by an external template scanner binary.
pub struct TemplateDetector {
    config: DetectorConfig,
}

impl TemplateDetector {
    /// Create a detector adapter with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: DetectorConfig::default(),
        }
    }

    /// Create a detector adapter with custom configuration.
    #[must_use]
    pub fn with_config(config: DetectorConfig) -> Self {
        Self { config }
    }
}

impl Default for TemplateDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VulnerabilityDetection for TemplateDetector {
    async fn detect(&self, endpoints: &[Endpoint], mode: ScanMode) -> Result<Vec<RawFinding>> {
        // The scanner takes its targets as a list file
        let temp_dir = tempfile::tempdir()?;
        let list_file = temp_dir.path().join("endpoints.txt");
        let list_contents = endpoints
            .iter()
            .map(|e| e.url.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        std::fs::write(&list_file, list_contents)?;

        let mut cmd = Command::new(&self.config.binary);
        cmd.arg("-l")
            .arg(&list_file)
            .arg("-severity")
            .arg(SEVERITY_LEVELS)
            .arg("-rl")
            .arg(self.config.rate_limit.to_string())
            .arg("-timeout")
            .arg(self.config.request_timeout.as_secs().to_string())
            .arg("-silent")
            .arg("-jsonl");

        if let Some(templates_dir) = &self.config.templates_dir {
            cmd.arg("-t").arg(templates_dir);
        }

        // Deep scans additionally run active templates against parameters
        if mode == ScanMode::Deep {
            cmd.arg("-dast");
        }

        tracing::info!(
            endpoints = endpoints.len(),
            %mode,
            binary = %self.config.binary,
            "starting vulnerability detection"
        );

        let output = tokio::time::timeout(self.config.timeout, cmd.output())
            .await
            .map_err(|_| DetectError::Timeout {
                seconds: self.config.timeout.as_secs(),
            })?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DetectError::ToolMissing {
                        binary: self.config.binary.clone(),
                    }
                } else {
                    DetectError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(DetectError::ToolFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let findings = parse_findings(&String::from_utf8_lossy(&output.stdout));

        tracing::info!(count = findings.len(), "vulnerability detection complete");

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detector_config_from_app_config() {
        let app_detection = DetectionConfig::default();
        let config = DetectorConfig::from(&app_detection);

        assert_eq!(config.binary, "nuclei");
        assert_eq!(config.rate_limit, 50);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.timeout, Duration::from_secs(600));
        assert!(config.templates_dir.is_none());
    }

    #[tokio::test]
    async fn test_missing_binary_reported() {
        let detector = TemplateDetector::with_config(DetectorConfig {
            binary: "sentra-test-no-such-scanner".to_string(),
            ..DetectorConfig::default()
        });

        let endpoints = vec![Endpoint::new("https://example.com/")];
        let result = detector.detect(&endpoints, ScanMode::Quick).await;

        assert!(matches!(result, Err(DetectError::ToolMissing { .. })));
    }
}
