//! Document health triage.
//!
//! Three independent signature checks decide whether a document is sound
//! enough for high-fidelity rendering or should go straight to the export
//! fallback chain. This is a heuristic gate, not a correctness proof; the
//! thresholds are tunable values, not derived constants.
#![allow(dead_code)]

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Structural soundness classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthVerdict {
    Healthy,
    Warning,
    Critical,
}

/// Full triage output: verdict plus human-readable anomaly descriptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub verdict: HealthVerdict,
    pub anomalies: Vec<String>,
    pub signature_count: u32,
}

/// Tunable cutoffs for verdict aggregation.
/// `warning_max` is the highest signature count still classified `warning`;
/// anything above it is `critical`. Zero signatures is always `healthy`.
#[derive(Debug, Clone, Copy)]
pub struct TriageThresholds {
    pub warning_max: u32,
}

impl Default for TriageThresholds {
    fn default() -> Self {
        Self { warning_max: 3 }
    }
}

// Four alternating-case characters (lower-upper-lower-upper) — the signature
// of encoding corruption in generative output.
static ALTERNATING_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z][A-Z][a-z][A-Z]").unwrap());

const TRUNCATION_LINE_LEN: usize = 50;
const TRUNCATION_LINE_ALLOWANCE: usize = 2;

const BALANCED_TAGS: &[&str] = &[
    "p", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Scores markup with the default thresholds.
pub fn score(markup: &str) -> HealthReport {
    score_with(markup, &TriageThresholds::default())
}

/// Scores markup against explicit thresholds.
pub fn score_with(markup: &str, thresholds: &TriageThresholds) -> HealthReport {
    let mut anomalies = Vec::new();
    let mut signatures = 0u32;

    let corruption = ALTERNATING_CASE.find_iter(markup).count() as u32;
    if corruption > 0 {
        signatures += corruption;
        anomalies.push(format!(
            "{corruption} alternating-case run(s) suggest encoding corruption"
        ));
    }

    // Long lines ending in a hyphen are mid-word truncations. A couple can be
    // legitimate soft hyphenation; more than the allowance is a signature.
    let hyphen_lines = markup
        .lines()
        .filter(|l| l.len() > TRUNCATION_LINE_LEN && l.trim_end().ends_with('-'))
        .count();
    if hyphen_lines > TRUNCATION_LINE_ALLOWANCE {
        signatures += hyphen_lines as u32;
        anomalies.push(format!(
            "{hyphen_lines} long lines end in a hyphen (truncated output)"
        ));
    }

    for tag in BALANCED_TAGS {
        let opens = markup.matches(&format!("<{tag}>")).count();
        let closes = markup.matches(&format!("</{tag}>")).count();
        if opens != closes {
            let diff = opens.abs_diff(closes) as u32;
            signatures += diff;
            anomalies.push(format!(
                "<{tag}> imbalance: {opens} opening vs {closes} closing"
            ));
        }
    }

    let verdict = if signatures == 0 {
        HealthVerdict::Healthy
    } else if signatures <= thresholds.warning_max {
        HealthVerdict::Warning
    } else {
        HealthVerdict::Critical
    };

    HealthReport {
        verdict,
        anomalies,
        signature_count: signatures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_document_is_healthy() {
        let markup = "<h1>Jane Doe</h1>\n<h2>PROFILE</h2>\n<p>Led a payments team of 12.</p>";
        let report = score(markup);
        assert_eq!(report.verdict, HealthVerdict::Healthy);
        assert!(report.anomalies.is_empty());
        assert_eq!(report.signature_count, 0);
    }

    #[test]
    fn test_empty_input_is_healthy() {
        assert_eq!(score("").verdict, HealthVerdict::Healthy);
    }

    #[test]
    fn test_alternating_case_detected() {
        let report = score("<p>normal text aBcDeF corrupted</p>");
        assert!(report.signature_count > 0);
        assert!(report.anomalies[0].contains("alternating-case"));
    }

    #[test]
    fn test_single_tag_imbalance_is_warning() {
        let report = score("<p>open paragraph");
        assert_eq!(report.verdict, HealthVerdict::Warning);
        assert_eq!(report.signature_count, 1);
    }

    #[test]
    fn test_many_imbalances_are_critical() {
        let report = score("<ul><ul><p><p><h2>x");
        assert_eq!(report.verdict, HealthVerdict::Critical);
        assert!(report.signature_count > 3, "got {}", report.signature_count);
    }

    #[test]
    fn test_two_hyphen_lines_within_allowance() {
        let line = format!("{}-", "x".repeat(60));
        let markup = format!("{line}\n{line}");
        let report = score(&markup);
        assert_eq!(report.verdict, HealthVerdict::Healthy);
    }

    #[test]
    fn test_three_hyphen_lines_flagged_as_truncation() {
        let line = format!("{}-", "x".repeat(60));
        let markup = format!("{line}\n{line}\n{line}");
        let report = score(&markup);
        assert_ne!(report.verdict, HealthVerdict::Healthy);
        assert!(report.anomalies.iter().any(|a| a.contains("hyphen")));
    }

    #[test]
    fn test_thresholds_are_tunable() {
        // One imbalance is warning at default, critical at warning_max = 0.
        let strict = TriageThresholds { warning_max: 0 };
        let report = score_with("<p>open paragraph", &strict);
        assert_eq!(report.verdict, HealthVerdict::Critical);
    }
}
