//! Subprocess-backed crawler adapter.
//!
//! Drives an external crawling tool (katana-compatible CLI) and parses its
//! JSONL output into deduplicated endpoints.

use crate::error::{DiscoveryError, Result};
use crate::EndpointDiscovery;
use async_trait::async_trait;
use sentra_core::config::DiscoveryConfig;
use sentra_core::{Endpoint, ScanMode, TargetUrl};
use std::collections::HashSet;
use std::time::Duration;
use tokio::process::Command;

/// Configuration for the crawler subprocess.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Crawler binary name or path
    pub binary: String,
    /// Crawl depth for quick scans; deep scans double this
    pub crawl_depth: u8,
    /// Enable JavaScript parsing
    pub parse_javascript: bool,
    /// Enable form extraction
    pub extract_forms: bool,
    /// Adapter-local timeout
    pub timeout: Duration,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self::from(&DiscoveryConfig::default())
    }
}

impl From<&DiscoveryConfig> for CrawlerConfig {
    fn from(config: &DiscoveryConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            crawl_depth: config.crawl_depth,
            parse_javascript: config.parse_javascript,
            extract_forms: config.extract_forms,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Endpoint discovery backed by an external crawler binary.
pub struct CrawlerDiscovery {
    config: CrawlerConfig,
}

impl CrawlerDiscovery {
    /// Create a crawler adapter with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Create a crawler adapter with custom configuration.
    #[must_use]
    pub fn with_config(config: CrawlerConfig) -> Self {
        Self { config }
    }

    /// Crawl depth for the given mode.
    fn depth_for_mode(&self, mode: ScanMode) -> u8 {
        match mode {
            ScanMode::Quick => self.config.crawl_depth,
            ScanMode::Deep => self.config.crawl_depth.saturating_mul(2),
        }
    }
}

impl Default for CrawlerDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EndpointDiscovery for CrawlerDiscovery {
    async fn discover(&self, target: &TargetUrl, mode: ScanMode) -> Result<Vec<Endpoint>> {
        let depth = self.depth_for_mode(mode);

        let mut cmd = Command::new(&self.config.binary);
        cmd.arg("-u")
            .arg(target.as_str())
            .arg("-d")
            .arg(depth.to_string())
            .arg("-silent")
            .arg("-jsonl");

        if self.config.parse_javascript {
            cmd.arg("-jc");
        }
        if self.config.extract_forms {
            cmd.arg("-fx");
        }

        tracing::info!(
            target = %target,
            %mode,
            depth,
            binary = %self.config.binary,
            "starting endpoint discovery"
        );

        let output = tokio::time::timeout(self.config.timeout, cmd.output())
            .await
            .map_err(|_| DiscoveryError::Timeout {
                seconds: self.config.timeout.as_secs(),
            })?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DiscoveryError::ToolMissing {
                        binary: self.config.binary.clone(),
                    }
                } else {
                    DiscoveryError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(DiscoveryError::ToolFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let endpoints = parse_endpoints(&String::from_utf8_lossy(&output.stdout));

        tracing::info!(
            target = %target,
            count = endpoints.len(),
            "endpoint discovery complete"
        );
        if !endpoints.is_empty() {
            let sample: Vec<&str> = endpoints.iter().take(5).map(|e| e.url.as_str()).collect();
            tracing::debug!(?sample, "sample discovered endpoints");
        }

        Ok(endpoints)
    }
}

/// Parse crawler JSONL output into deduplicated endpoints.
///
/// Each line is either `{"request": {"endpoint": "..."}}` or `{"url": "..."}`
/// depending on the crawler version; unparseable lines are skipped.
/// First-seen order is preserved.
#[must_use]
pub fn parse_endpoints(output: &str) -> Vec<Endpoint> {
    let mut seen = HashSet::new();
    let mut endpoints = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Ok(value) = serde_json::from_str::<serde_json::Value>(line) else {
            continue;
        };

        let url = value
            .get("request")
            .and_then(|r| r.get("endpoint"))
            .and_then(|e| e.as_str())
            .or_else(|| value.get("url").and_then(|u| u.as_str()));

        if let Some(url) = url {
            if seen.insert(url.to_string()) {
                endpoints.push(Endpoint::new(url));
            }
        }
    }

    endpoints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoints_request_form() {
        let output = r#"{"request": {"endpoint": "https://example.com/login"}}
{"request": {"endpoint": "https://example.com/search?q=test"}}"#;

        let endpoints = parse_endpoints(output);
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].url, "https://example.com/login");
        assert!(!endpoints[0].has_params);
        assert!(endpoints[1].has_params);
    }

    #[test]
    fn test_parse_endpoints_url_form() {
        let output = r#"{"url": "https://example.com/api/v1/users"}"#;

        let endpoints = parse_endpoints(output);
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].url, "https://example.com/api/v1/users");
    }

    #[test]
    fn test_parse_endpoints_deduplicates_preserving_order() {
        let output = r#"{"url": "https://example.com/b"}
{"url": "https://example.com/a"}
{"url": "https://example.com/b"}"#;

        let endpoints = parse_endpoints(output);
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].url, "https://example.com/b");
        assert_eq!(endpoints[1].url, "https://example.com/a");
    }

    #[test]
    fn test_parse_endpoints_skips_garbage() {
        let output = "not json\n\n{\"unrelated\": true}\n{\"url\": \"https://example.com/\"}";

        let endpoints = parse_endpoints(output);
        assert_eq!(endpoints.len(), 1);
    }

    #[test]
    fn test_depth_for_mode() {
        let discovery = CrawlerDiscovery::new();
        assert_eq!(discovery.depth_for_mode(ScanMode::Quick), 2);
        assert_eq!(discovery.depth_for_mode(ScanMode::Deep), 4);
    }

    #[tokio::test]
    async fn test_missing_binary_reported() {
        let discovery = CrawlerDiscovery::with_config(CrawlerConfig {
            binary: "sentra-test-no-such-crawler".to_string(),
            ..CrawlerConfig::default()
        });

        let target = TargetUrl::parse("https://example.com").expect("valid target");
        let result = discovery.discover(&target, ScanMode::Quick).await;

        assert!(matches!(result, Err(DiscoveryError::ToolMissing { .. })));
    }
}
