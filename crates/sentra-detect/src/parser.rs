//! Parsers and scoring heuristics for template scanner output.
//!
//! The scanner emits JSONL when asked to, but older builds and some
//! configurations fall back to a bracketed plain-text line per finding.
//! Both formats are handled; unparseable lines are skipped.

use regex::Regex;
use sentra_core::{RawFinding, Severity};
use serde::Deserialize;
use std::sync::OnceLock;

/// Default ease-of-fix weight when no tag matches the heuristic table.
const DEFAULT_EASE_OF_FIX: f64 = 5.0;

#[derive(Debug, Deserialize)]
struct ToolFinding {
    #[serde(rename = "template-id")]
    template_id: String,
    #[serde(default)]
    info: ToolFindingInfo,
    #[serde(rename = "matched-at")]
    matched_at: Option<String>,
    host: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ToolFindingInfo {
    name: Option<String>,
    severity: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

impl ToolFinding {
    fn into_raw_finding(self) -> RawFinding {
        let severity =
            Severity::parse_lenient(self.info.severity.as_deref().unwrap_or_default());
        let title = self
            .info
            .name
            .unwrap_or_else(|| self.template_id.clone());
        let url = self
            .matched_at
            .or(self.host)
            .unwrap_or_else(|| "unknown".to_string());

        RawFinding {
            ease_of_fix: ease_of_fix_for_tags(&self.info.tags),
            confidence: confidence_for(severity),
            name: self.template_id,
            title,
            url,
            severity,
        }
    }
}

/// Parse scanner output (JSONL with plain-line fallback) into raw findings.
#[must_use]
pub fn parse_findings(output: &str) -> Vec<RawFinding> {
    let mut findings = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Ok(tool_finding) = serde_json::from_str::<ToolFinding>(line) {
            findings.push(tool_finding.into_raw_finding());
        } else if let Some(finding) = parse_plain_line(line) {
            findings.push(finding);
        }
    }

    findings
}

/// Parse a plain-text finding line of the form
/// `[template-id] [protocol] [severity] url`.
fn parse_plain_line(line: &str) -> Option<RawFinding> {
    static LINE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = LINE_REGEX.get_or_init(|| {
        Regex::new(r"\[(?P<id>[^\]]+)\] \[(?P<proto>[^\]]+)\] \[(?P<sev>[^\]]+)\] (?P<url>\S+)")
            .expect("valid regex")
    });

    let captures = regex.captures(line)?;
    let name = captures["id"].to_string();
    let severity = Severity::parse_lenient(&captures["sev"]);

    Some(RawFinding {
        title: name.clone(),
        url: captures["url"].to_string(),
        ease_of_fix: DEFAULT_EASE_OF_FIX,
        confidence: confidence_for(severity),
        name,
        severity,
    })
}

/// Ease-of-fix weight estimated from template tags (higher is easier).
///
/// Header and TLS issues are usually configuration changes; injection
/// findings need code or query changes. The first matching tag wins.
#[must_use]
pub fn ease_of_fix_for_tags(tags: &[String]) -> f64 {
    for tag in tags {
        let ease = match tag.as_str() {
            "header" => 10.0,
            "csp" | "hsts" => 9.0,
            "tls" | "ssl" => 8.0,
            "ratelimit" => 7.0,
            "redirect" => 6.0,
            "xss" | "csrf" => 4.0,
            "sqli" => 2.0,
            _ => continue,
        };
        return ease;
    }
    DEFAULT_EASE_OF_FIX
}

/// Confidence weight for a finding of the given severity.
///
/// Template matches carry high confidence; informational matches less so.
#[must_use]
pub fn confidence_for(severity: Severity) -> f64 {
    if severity == Severity::Info {
        0.5
    } else {
        0.8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jsonl_finding() {
        let output = r#"{"template-id":"sqli-error-based","type":"http","info":{"name":"SQL Injection (Error Based)","severity":"critical","tags":["sqli","injection"]},"matched-at":"https://example.com/search?q=1"}"#;

        let findings = parse_findings(output);
        assert_eq!(findings.len(), 1);

        let finding = &findings[0];
        assert_eq!(finding.name, "sqli-error-based");
        assert_eq!(finding.title, "SQL Injection (Error Based)");
        assert_eq!(finding.url, "https://example.com/search?q=1");
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.ease_of_fix, 2.0);
        assert_eq!(finding.confidence, 0.8);
    }

    #[test]
    fn test_parse_jsonl_falls_back_to_host() {
        let output = r#"{"template-id":"ssl-issuer","info":{"severity":"info","tags":["ssl"]},"host":"https://example.com"}"#;

        let findings = parse_findings(output);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].url, "https://example.com");
        assert_eq!(findings[0].title, "ssl-issuer");
        assert_eq!(findings[0].confidence, 0.5);
    }

    #[test]
    fn test_parse_plain_line_fallback() {
        let output = "[missing-csp] [http] [medium] https://example.com/";

        let findings = parse_findings(output);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].name, "missing-csp");
        assert_eq!(findings[0].severity, Severity::Medium);
        assert_eq!(findings[0].url, "https://example.com/");
        assert_eq!(findings[0].ease_of_fix, DEFAULT_EASE_OF_FIX);
    }

    #[test]
    fn test_parse_mixed_output_skips_noise() {
        let output = "\
{\"template-id\":\"hsts-missing\",\"info\":{\"severity\":\"low\",\"tags\":[\"hsts\"]},\"matched-at\":\"https://example.com\"}
progress: 50%
[xss-reflected] [http] [high] https://example.com/comment
";

        let findings = parse_findings(output);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].name, "hsts-missing");
        assert_eq!(findings[1].name, "xss-reflected");
    }

    #[test]
    fn test_ease_of_fix_table() {
        let tags = |names: &[&str]| names.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();

        assert_eq!(ease_of_fix_for_tags(&tags(&["header"])), 10.0);
        assert_eq!(ease_of_fix_for_tags(&tags(&["csp"])), 9.0);
        assert_eq!(ease_of_fix_for_tags(&tags(&["tls"])), 8.0);
        assert_eq!(ease_of_fix_for_tags(&tags(&["sqli"])), 2.0);
        assert_eq!(ease_of_fix_for_tags(&tags(&["unknown"])), 5.0);
        assert_eq!(ease_of_fix_for_tags(&[]), 5.0);
        // First matching tag wins
        assert_eq!(ease_of_fix_for_tags(&tags(&["misc", "sqli", "header"])), 2.0);
    }

    #[test]
    fn test_confidence_heuristic() {
        assert_eq!(confidence_for(Severity::Info), 0.5);
        assert_eq!(confidence_for(Severity::Low), 0.8);
        assert_eq!(confidence_for(Severity::Critical), 0.8);
    }

    #[test]
    fn test_missing_severity_defaults_to_info() {
        let output = r#"{"template-id":"tech-detect","matched-at":"https://example.com"}"#;

        let findings = parse_findings(output);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Info);
    }
}
