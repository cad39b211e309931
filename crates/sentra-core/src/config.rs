//! Configuration management for Sentra.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main application configuration.
///
/// This is loaded from `~/.config/sentra/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scan pipeline settings
    pub scanning: ScanningConfig,
    /// Endpoint discovery adapter settings
    pub discovery: DiscoveryConfig,
    /// Vulnerability detection adapter settings
    pub detection: DetectionConfig,
    /// LLM interpretation settings
    pub llm: LlmConfig,
    /// Job store settings
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `SENTRA_MAX_FINDINGS`: Override the findings cap
    /// - `SENTRA_DISCOVERY_TIMEOUT_SECS`: Override the discovery timeout
    /// - `SENTRA_DETECT_TIMEOUT_SECS`: Override the detection timeout
    /// - `SENTRA_LLM_ENABLED`: Override LLM interpretation (true/false)
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        // Override from environment
        if let Ok(val) = std::env::var("SENTRA_MAX_FINDINGS") {
            if let Ok(cap) = val.parse() {
                config.scanning.max_findings = cap;
                tracing::debug!("Override scanning.max_findings from env: {}", cap);
            }
        }

        if let Ok(val) = std::env::var("SENTRA_DISCOVERY_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.discovery.timeout_secs = secs;
                tracing::debug!("Override discovery.timeout_secs from env: {}", secs);
            }
        }

        if let Ok(val) = std::env::var("SENTRA_DETECT_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.detection.timeout_secs = secs;
                tracing::debug!("Override detection.timeout_secs from env: {}", secs);
            }
        }

        if let Ok(val) = std::env::var("SENTRA_LLM_ENABLED") {
            if let Ok(enabled) = val.parse() {
                config.llm.enabled = enabled;
                tracing::debug!("Override llm.enabled from env: {}", enabled);
            }
        }

        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/sentra/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("io", "sentra", "sentra").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/sentra`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("io", "sentra", "sentra").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

/// Scan pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Maximum number of findings kept after prioritization
    pub max_findings: usize,
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self { max_findings: 10 }
    }
}

/// Endpoint discovery adapter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Crawler binary to invoke
    pub binary: String,
    /// Crawl depth for quick scans (deep scans double this)
    pub crawl_depth: u8,
    /// Whether to parse JavaScript for additional endpoints
    pub parse_javascript: bool,
    /// Whether to extract form targets
    pub extract_forms: bool,
    /// Adapter-local timeout in seconds
    pub timeout_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            binary: "katana".to_string(),
            crawl_depth: 2,
            parse_javascript: true,
            extract_forms: true,
            timeout_secs: 120,
        }
    }
}

/// Vulnerability detection adapter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Template scanner binary to invoke
    pub binary: String,
    /// Optional template directory override
    pub templates_dir: Option<PathBuf>,
    /// Requests per second limit passed to the scanner
    pub rate_limit: u32,
    /// Per-request timeout in seconds passed to the scanner
    pub request_timeout_secs: u64,
    /// Adapter-local timeout for the whole detection stage, in seconds
    pub timeout_secs: u64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            binary: "nuclei".to_string(),
            templates_dir: None,
            rate_limit: 50,
            request_timeout_secs: 10,
            timeout_secs: 600,
        }
    }
}

/// LLM interpretation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Whether to interpret findings via the LLM provider.
    /// When disabled, reports carry placeholder explanations.
    pub enabled: bool,
    /// Model identifier
    pub model: String,
    /// API base URL (OpenAI-compatible chat completions)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Job store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Snapshot file path; defaults to `<data_dir>/scan_history.json`
    pub snapshot_path: Option<PathBuf>,
}

impl StoreConfig {
    /// Resolve the snapshot path, falling back to the default data dir.
    pub fn resolved_snapshot_path(&self) -> ConfigResult<PathBuf> {
        match &self.snapshot_path {
            Some(path) => Ok(path.clone()),
            None => Ok(AppConfig::data_dir()?.join("scan_history.json")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.scanning.max_findings, 10);
        assert_eq!(config.discovery.binary, "katana");
        assert_eq!(config.discovery.crawl_depth, 2);
        assert_eq!(config.discovery.timeout_secs, 120);
        assert_eq!(config.detection.binary, "nuclei");
        assert_eq!(config.detection.rate_limit, 50);
        assert_eq!(config.detection.timeout_secs, 600);
        assert!(config.llm.enabled);
        assert!(config.store.snapshot_path.is_none());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
            [scanning]
            max_findings = 5

            [detection]
            rate_limit = 10
        "#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.scanning.max_findings, 5);
        assert_eq!(config.detection.rate_limit, 10);
        // Untouched sections keep their defaults
        assert_eq!(config.detection.binary, "nuclei");
        assert_eq!(config.discovery.crawl_depth, 2);
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = AppConfig::default();
        config.scanning.max_findings = 3;
        config.llm.enabled = false;
        config.store.snapshot_path = Some(PathBuf::from("/tmp/history.json"));

        let serialized = toml::to_string_pretty(&config).expect("serialize config");
        let parsed: AppConfig = toml::from_str(&serialized).expect("parse config");

        assert_eq!(parsed.scanning.max_findings, 3);
        assert!(!parsed.llm.enabled);
        assert_eq!(
            parsed.store.snapshot_path,
            Some(PathBuf::from("/tmp/history.json"))
        );
    }

    #[test]
    fn test_explicit_snapshot_path_resolution() {
        let store = StoreConfig {
            snapshot_path: Some(PathBuf::from("/tmp/sentra-test/history.json")),
        };

        let resolved = store.resolved_snapshot_path().expect("resolve path");
        assert_eq!(resolved, PathBuf::from("/tmp/sentra-test/history.json"));
    }
}
