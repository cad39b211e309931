//! Finding prioritization engine.
//!
//! Pure and deterministic: deduplicates the detector's noisy output,
//! scores what remains, and keeps the top few issues worth a developer's
//! attention. No I/O.

use sentra_core::RawFinding;
use std::cmp::Ordering;
use std::collections::HashMap;

/// A raw finding with its computed priority score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredFinding {
    /// The underlying finding
    pub raw: RawFinding,
    /// `impact × ease_of_fix × confidence`
    pub score: f64,
}

/// Rank findings and keep the top `cap`.
///
/// Findings sharing a `(name, url)` pair are duplicates (overlapping
/// detection templates flag the same endpoint); only the best-scoring one
/// survives. Ordering is fully deterministic: score descending, then
/// severity descending, then url ascending, then first-seen order.
#[must_use]
pub fn prioritize(findings: Vec<RawFinding>, cap: usize) -> Vec<ScoredFinding> {
    let mut ranked: Vec<ScoredFinding> = Vec::new();
    let mut slots: HashMap<(String, String), usize> = HashMap::new();

    for raw in findings {
        let key = (raw.name.clone(), raw.url.clone());
        let candidate = ScoredFinding {
            score: raw.score(),
            raw,
        };

        match slots.get(&key) {
            Some(&slot) => {
                if replaces(&candidate, &ranked[slot]) {
                    ranked[slot] = candidate;
                }
            }
            None => {
                slots.insert(key, ranked.len());
                ranked.push(candidate);
            }
        }
    }

    // Stable sort: full ties keep first-seen order
    ranked.sort_by(rank_order);
    ranked.truncate(cap);
    ranked
}

/// Whether a duplicate candidate should replace the entry already kept.
///
/// Higher score wins; equal scores fall back to severity; a full tie
/// keeps the first-seen entry.
fn replaces(candidate: &ScoredFinding, current: &ScoredFinding) -> bool {
    match candidate.score.partial_cmp(&current.score) {
        Some(Ordering::Greater) => true,
        Some(Ordering::Equal) => candidate.raw.severity > current.raw.severity,
        _ => false,
    }
}

fn rank_order(a: &ScoredFinding, b: &ScoredFinding) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.raw.severity.cmp(&a.raw.severity))
        .then_with(|| a.raw.url.cmp(&b.raw.url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentra_core::Severity;

    fn finding(
        name: &str,
        url: &str,
        severity: Severity,
        ease_of_fix: f64,
        confidence: f64,
    ) -> RawFinding {
        RawFinding {
            name: name.to_string(),
            title: name.to_string(),
            url: url.to_string(),
            severity,
            ease_of_fix,
            confidence,
        }
    }

    #[test]
    fn test_empty_input_is_empty_success() {
        assert!(prioritize(Vec::new(), 10).is_empty());
    }

    #[test]
    fn test_scoring_ranks_critical_fix_over_medium() {
        // critical: 10 × 2 × 0.9 = 18; medium: 5 × 3 × 1.0 = 15
        let x = finding("sqli", "https://a.example.com/q", Severity::Critical, 2.0, 0.9);
        let y = finding("csp", "https://a.example.com/", Severity::Medium, 3.0, 1.0);

        let ranked = prioritize(vec![y, x], 10);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].raw.name, "sqli");
        assert!((ranked[0].score - 18.0).abs() < f64::EPSILON);
        assert_eq!(ranked[1].raw.name, "csp");
        assert!((ranked[1].score - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_deterministic_across_calls() {
        let findings = vec![
            finding("a", "https://example.com/1", Severity::High, 4.0, 0.8),
            finding("b", "https://example.com/2", Severity::High, 4.0, 0.8),
            finding("c", "https://example.com/3", Severity::Low, 9.0, 0.8),
            finding("d", "https://example.com/4", Severity::Critical, 2.0, 0.5),
        ];

        let first = prioritize(findings.clone(), 10);
        let second = prioritize(findings, 10);
        assert_eq!(first, second);
    }

    #[test]
    fn test_cap_is_respected() {
        let findings: Vec<RawFinding> = (0..25)
            .map(|i| {
                finding(
                    &format!("issue-{i}"),
                    &format!("https://example.com/{i}"),
                    Severity::Medium,
                    5.0,
                    0.8,
                )
            })
            .collect();

        let ranked = prioritize(findings, 10);
        assert_eq!(ranked.len(), 10);
    }

    #[test]
    fn test_cap_larger_than_input() {
        let findings = vec![finding("a", "https://example.com/", Severity::Low, 5.0, 0.8)];
        assert_eq!(prioritize(findings, 10).len(), 1);
    }

    #[test]
    fn test_duplicates_collapse_to_one() {
        let a = finding("missing-csp", "https://example.com/", Severity::High, 9.0, 0.8);
        let ranked = prioritize(vec![a.clone(), a], 10);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_duplicate_keeps_highest_scoring() {
        // Same template and endpoint reported twice with different grading
        let weak = finding("xss", "https://example.com/c", Severity::Medium, 4.0, 0.5);
        let strong = finding("xss", "https://example.com/c", Severity::High, 4.0, 0.8);

        let ranked = prioritize(vec![weak, strong], 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].raw.severity, Severity::High);
    }

    #[test]
    fn test_duplicate_score_tie_breaks_by_severity() {
        // Equal scores: 2×4×0.8 = 8×0.8×... pick values so scores match
        // low: 2 × 8 × 0.5 = 8; high: 8 × 1.25 × 0.8 = 8
        let low = finding("x", "https://example.com/", Severity::Low, 8.0, 0.5);
        let high = finding("x", "https://example.com/", Severity::High, 1.25, 0.8);

        let ranked = prioritize(vec![low, high], 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].raw.severity, Severity::High);
    }

    #[test]
    fn test_distinct_names_on_same_url_are_kept() {
        let a = finding("missing-csp", "https://example.com/", Severity::Low, 9.0, 0.8);
        let b = finding("missing-hsts", "https://example.com/", Severity::Low, 9.0, 0.8);

        let ranked = prioritize(vec![a, b], 10);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_order_ties_break_by_severity_then_url() {
        // Identical scores: medium 5×4×0.8 = 16; high 8×2.5×0.8 = 16
        let medium = finding("m", "https://a.example.com/", Severity::Medium, 4.0, 0.8);
        let high = finding("h", "https://b.example.com/", Severity::High, 2.5, 0.8);
        let high_later_url = finding("h2", "https://c.example.com/", Severity::High, 2.5, 0.8);

        let ranked = prioritize(vec![medium, high_later_url, high], 10);
        assert_eq!(ranked[0].raw.name, "h");
        assert_eq!(ranked[1].raw.name, "h2");
        assert_eq!(ranked[2].raw.name, "m");
    }

    #[test]
    fn test_output_no_longer_than_dedup_input() {
        let a = finding("a", "https://example.com/", Severity::High, 4.0, 0.8);
        let findings = vec![a.clone(), a.clone(), a];

        let ranked = prioritize(findings, 10);
        assert_eq!(ranked.len(), 1);
    }
}
