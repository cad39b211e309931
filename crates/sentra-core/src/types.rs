//! Shared types used across the Sentra scan orchestrator.
//!
//! This module defines the domain model: scan identity, validated targets,
//! severity grading, and the finding/result shapes that flow through the
//! scan pipeline.

use crate::error::SentraError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use url::Url;

/// Newtype for scan job identifiers with validation.
///
/// Scan IDs must be valid UUIDs (v4 format).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanId(String);

impl ScanId {
    /// Create a new `ScanId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is not a valid UUID v4.
    pub fn new(id: impl Into<String>) -> Result<Self, SentraError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Create a new random `ScanId` using UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that a string is a valid UUID v4.
    fn validate(id: &str) -> Result<(), SentraError> {
        static UUID_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = UUID_REGEX.get_or_init(|| {
            Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
                .expect("valid regex")
        });

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(SentraError::Validation(format!(
                "invalid scan ID: must be a valid UUID v4, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for scan targets with validation.
///
/// Targets must be well-formed absolute HTTP or HTTPS URLs with a host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetUrl(String);

impl TargetUrl {
    /// Parse and validate a target URL.
    ///
    /// # Errors
    /// Returns error if the string is not an absolute http(s) URL.
    pub fn parse(raw: &str) -> Result<Self, SentraError> {
        let parsed = Url::parse(raw)
            .map_err(|e| SentraError::Validation(format!("invalid target URL '{raw}': {e}")))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SentraError::Validation(format!(
                "invalid target URL '{raw}': scheme must be http or https"
            )));
        }

        if parsed.host_str().is_none() {
            return Err(SentraError::Validation(format!(
                "invalid target URL '{raw}': missing host"
            )));
        }

        Ok(Self(parsed.to_string()))
    }

    /// Get the normalized URL string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scan mode selected at submission.
///
/// The mode only tunes stage adapter parameters (crawl depth, template
/// selection); the orchestrator itself treats it as opaque.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Fast surface scan with shallow crawling
    #[default]
    Quick,
    /// Thorough scan with deeper crawling and extended templates
    Deep,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quick => write!(f, "quick"),
            Self::Deep => write!(f, "deep"),
        }
    }
}

/// Severity grade attached to a raw finding.
///
/// Ordered from least to most severe; the derived ordering is relied on
/// for ranking ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational note, no direct risk
    Info,
    /// Low-risk issue
    Low,
    /// Medium-risk issue
    Medium,
    /// High-risk issue
    High,
    /// Critical issue requiring immediate attention
    Critical,
}

impl Severity {
    /// Fixed impact weight used by the prioritization score.
    #[must_use]
    pub fn impact_weight(self) -> f64 {
        match self {
            Self::Critical => 10.0,
            Self::High => 8.0,
            Self::Medium => 5.0,
            Self::Low => 2.0,
            Self::Info => 1.0,
        }
    }

    /// Numeric rank (0 = info .. 4 = critical).
    #[must_use]
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Parse a severity label from detector output.
    ///
    /// Unknown or empty labels fall back to `Info` rather than failing,
    /// since detector output is noisy by nature.
    #[must_use]
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => Self::Critical,
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// A reachable URL discovered on the scanned target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Discovered URL
    pub url: String,
    /// Whether the URL carries query parameters
    pub has_params: bool,
}

impl Endpoint {
    /// Create an endpoint from a discovered URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let has_params = url.contains('?');
        Self { url, has_params }
    }
}

/// An unscored, unexplained vulnerability report from the detection stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFinding {
    /// Issue identifier (detection template id)
    pub name: String,
    /// Human-readable issue title from the detector
    pub title: String,
    /// Affected endpoint
    pub url: String,
    /// Severity grade
    pub severity: Severity,
    /// Ease-of-fix weight supplied by the detection heuristics (higher is easier)
    pub ease_of_fix: f64,
    /// Detection confidence in [0, 1]
    pub confidence: f64,
}

impl RawFinding {
    /// Impact weight derived from the severity grade.
    #[must_use]
    pub fn impact(&self) -> f64 {
        self.severity.impact_weight()
    }

    /// Prioritization score: impact × ease of fix × confidence.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.impact() * self.ease_of_fix * self.confidence
    }
}

/// Plain-language explanation of a finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpretation {
    /// One-sentence description of the problem
    pub what_is_wrong: String,
    /// Business/safety impact
    pub why_it_matters: String,
    /// Concrete remediation steps
    pub how_to_fix: String,
}

impl Interpretation {
    /// Fallback explanation used when interpreting a single finding fails.
    ///
    /// Interpretation is an enhancement, so a degraded placeholder keeps
    /// the finding in the report instead of failing the scan.
    #[must_use]
    pub fn placeholder(finding: &RawFinding) -> Self {
        Self {
            what_is_wrong: format!("Automated finding: {}", finding.title),
            why_it_matters: "This was flagged as a security risk on your site.".to_string(),
            how_to_fix: format!("Review the remediation guidance for '{}'.", finding.name),
        }
    }
}

/// A prioritized finding with its attached explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Issue identifier (detection template id)
    pub name: String,
    /// Human-readable issue title
    pub title: String,
    /// Affected endpoint
    pub url: String,
    /// Severity grade
    pub severity: Severity,
    /// Prioritization score the ranking was based on
    pub score: f64,
    /// Plain-language explanation
    pub interpretation: Interpretation,
}

/// Aggregate counters describing a completed scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Scanned target URL
    pub target: String,
    /// Number of unique endpoints discovered
    pub total_endpoints: usize,
    /// Number of raw findings before prioritization
    pub raw_findings_count: usize,
    /// Number of findings in the final report
    pub top_issues_count: usize,
    /// Number of endpoints carrying query parameters
    pub params_found: usize,
    /// Wall-clock scan duration in seconds
    pub duration_seconds: f64,
}

/// Final result attached to a completed scan job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Aggregate counters
    pub summary: ScanSummary,
    /// Prioritized findings, highest score first
    pub findings: Vec<Finding>,
}
