//! Natural-language refinement intent parser.
//!
//! A rule-based, multi-label classifier: one utterance can yield several
//! directives ("make it more aggressive for tech roles and add metrics" is a
//! tone directive, an industry focus, and a quantification request at once).
//! Deterministic and auditable by construction — anything the rule set does
//! not anticipate degrades to a `Freeform` directive, never to an error, and
//! the parser never returns an empty set for a non-empty utterance.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Ordering weight for prompt assembly. Directives are never dropped,
/// only ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneValue {
    Aggressive,
    Professional,
    Concise,
    Technical,
    Confident,
    Friendly,
}

impl ToneValue {
    /// Fixed emphasis weight (1–5) carried into the compiled prompt.
    pub fn intensity(self) -> u8 {
        match self {
            ToneValue::Aggressive => 4,
            ToneValue::Professional => 3,
            ToneValue::Concise => 4,
            ToneValue::Technical => 4,
            ToneValue::Confident => 3,
            ToneValue::Friendly => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ToneValue::Aggressive => "aggressive",
            ToneValue::Professional => "professional",
            ToneValue::Concise => "concise",
            ToneValue::Technical => "technical",
            ToneValue::Confident => "confident",
            ToneValue::Friendly => "friendly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum StructureChange {
    AddSection { section: String },
    RemoveSection { section: String },
    Reorder,
    PageLimit { pages: u32 },
    Simplify,
    Expand,
}

/// Additional derived artifacts a user can request. These are new outputs,
/// not edits to the primary document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedFormat {
    InterviewPoints,
    SocialPost,
    ElevatorPitch,
    CoverLetterBullets,
}

/// A structured instruction derived from free text. One variant per
/// directive kind, each carrying only the fields that kind needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RefinementDirective {
    Tone { value: ToneValue, intensity: u8 },
    Focus { target: String, value: String },
    Structure(StructureChange),
    Quantify,
    FormatRequest { format: DerivedFormat },
    Freeform { utterance: String },
}

impl RefinementDirective {
    pub fn priority(&self) -> Priority {
        match self {
            RefinementDirective::Tone { .. } => Priority::High,
            RefinementDirective::Focus { .. } => Priority::High,
            RefinementDirective::Structure(_) => Priority::Medium,
            RefinementDirective::Quantify => Priority::High,
            RefinementDirective::FormatRequest { .. } => Priority::Medium,
            RefinementDirective::Freeform { .. } => Priority::Medium,
        }
    }
}

/// Ambient targeting the user configured outside the utterance. Folded in
/// as implicit high-priority focus directives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefinementContext {
    pub target_role: Option<String>,
    pub target_industry: Option<String>,
}

const TONE_FAMILIES: &[(ToneValue, &[&str])] = &[
    (
        ToneValue::Aggressive,
        &["more aggressive", "punchier", "hard-hitting", "bold"],
    ),
    (
        ToneValue::Professional,
        &["more professional", "formal", "corporate"],
    ),
    (
        ToneValue::Concise,
        &["more concise", "shorter", "brief", "tighten"],
    ),
    (
        ToneValue::Technical,
        &["more technical", "technical depth", "add tech"],
    ),
    (
        ToneValue::Confident,
        &["more confident", "assertive", "authoritative"],
    ),
    (
        ToneValue::Friendly,
        &["more friendly", "approachable", "warm"],
    ),
];

static FOCUS_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"focus on (leadership|management)").unwrap(),
            "leadership",
        ),
        (
            Regex::new(r"emphasize (technical|tech skills)").unwrap(),
            "technical",
        ),
        (
            Regex::new(r"highlight (quantifiable|metrics|numbers|data)").unwrap(),
            "quantification",
        ),
        (
            Regex::new(r"show (projects|portfolio work)").unwrap(),
            "projects",
        ),
        (
            Regex::new(r"prioritize (soft skills|communication)").unwrap(),
            "soft-skills",
        ),
        (
            Regex::new(r"target (us|uk|european|global)").unwrap(),
            "market-region",
        ),
    ]
});

static ADD_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"add (.*?) section").unwrap());
static REMOVE_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"remove (.*?) section").unwrap());
static PAGE_LIMIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"make it (\d+) pages?").unwrap());
static QUANTIFY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"add (more )?numbers|quantify|add metrics|add data").unwrap());
static INDUSTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"for (tech|fintech|startup|corporate|consulting)").unwrap());

static FORMAT_PATTERNS: LazyLock<Vec<(Regex, DerivedFormat)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"interview (points|prep|questions)").unwrap(),
            DerivedFormat::InterviewPoints,
        ),
        (
            Regex::new(r"linkedin (post|update|article)|social (post|update)").unwrap(),
            DerivedFormat::SocialPost,
        ),
        (
            Regex::new(r"elevator (pitch|summary)").unwrap(),
            DerivedFormat::ElevatorPitch,
        ),
        (
            Regex::new(r"cover letter (bullets?|points)").unwrap(),
            DerivedFormat::CoverLetterBullets,
        ),
    ]
});

/// Parses a refinement utterance into a non-empty directive set.
pub fn parse(utterance: &str, context: &RefinementContext) -> Vec<RefinementDirective> {
    let lower = utterance.to_lowercase();
    let mut directives = Vec::new();

    for (tone, phrases) in TONE_FAMILIES {
        if phrases.iter().any(|p| lower.contains(p)) {
            directives.push(RefinementDirective::Tone {
                value: *tone,
                intensity: tone.intensity(),
            });
        }
    }

    for (pattern, target) in FOCUS_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(&lower) {
            directives.push(RefinementDirective::Focus {
                target: (*target).to_string(),
                value: caps[1].to_string(),
            });
        }
    }

    if let Some(caps) = ADD_SECTION.captures(&lower) {
        directives.push(RefinementDirective::Structure(StructureChange::AddSection {
            section: caps[1].trim().to_string(),
        }));
    }
    if let Some(caps) = REMOVE_SECTION.captures(&lower) {
        directives.push(RefinementDirective::Structure(
            StructureChange::RemoveSection {
                section: caps[1].trim().to_string(),
            },
        ));
    }
    if lower.contains("reorder") || lower.contains("rearrange") {
        directives.push(RefinementDirective::Structure(StructureChange::Reorder));
    }
    if let Some(caps) = PAGE_LIMIT.captures(&lower) {
        if let Ok(pages) = caps[1].parse::<u32>() {
            directives.push(RefinementDirective::Structure(StructureChange::PageLimit {
                pages,
            }));
        }
    }
    if lower.contains("simplify") || lower.contains("streamline") {
        directives.push(RefinementDirective::Structure(StructureChange::Simplify));
    }
    if lower.contains("expand") || lower.contains("elaborate") || lower.contains("add detail") {
        directives.push(RefinementDirective::Structure(StructureChange::Expand));
    }

    if QUANTIFY.is_match(&lower) {
        directives.push(RefinementDirective::Quantify);
    }

    for (pattern, format) in FORMAT_PATTERNS.iter() {
        if pattern.is_match(&lower) {
            directives.push(RefinementDirective::FormatRequest { format: *format });
        }
    }

    if let Some(caps) = INDUSTRY.captures(&lower) {
        directives.push(RefinementDirective::Focus {
            target: "industry".to_string(),
            value: caps[1].to_string(),
        });
    }

    // Nothing recognized: carry the raw utterance through verbatim so the
    // compiler can still build a usable prompt.
    if directives.is_empty() {
        directives.push(RefinementDirective::Freeform {
            utterance: utterance.to_string(),
        });
    }

    // Ambient targeting applies even when the utterance never mentions it.
    if let Some(role) = context.target_role.as_deref().filter(|r| !r.is_empty()) {
        directives.push(RefinementDirective::Focus {
            target: "role".to_string(),
            value: role.to_string(),
        });
    }
    if let Some(industry) = context
        .target_industry
        .as_deref()
        .filter(|i| !i.is_empty())
    {
        directives.push(RefinementDirective::Focus {
            target: "industry".to_string(),
            value: industry.to_string(),
        });
    }

    directives
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_context() -> RefinementContext {
        RefinementContext::default()
    }

    #[test]
    fn test_multi_label_tone_industry_quantify() {
        let directives = parse(
            "make it more aggressive for tech roles and add metrics",
            &no_context(),
        );
        assert!(
            directives.iter().any(|d| matches!(
                d,
                RefinementDirective::Tone {
                    value: ToneValue::Aggressive,
                    ..
                }
            )),
            "expected an aggressive tone directive: {directives:?}"
        );
        assert!(
            directives
                .iter()
                .any(|d| matches!(d, RefinementDirective::Quantify)),
            "expected a quantify directive: {directives:?}"
        );
        assert!(directives
            .iter()
            .any(|d| matches!(d, RefinementDirective::Focus { target, .. } if target == "industry")));
    }

    #[test]
    fn test_unrecognized_utterance_degrades_to_freeform() {
        let directives = parse("sprinkle some magic dust on it", &no_context());
        assert_eq!(directives.len(), 1);
        assert!(matches!(
            &directives[0],
            RefinementDirective::Freeform { utterance } if utterance == "sprinkle some magic dust on it"
        ));
    }

    #[test]
    fn test_parser_never_returns_empty_set() {
        for utterance in ["x", "???", "do the thing", "make it pop"] {
            assert!(
                !parse(utterance, &no_context()).is_empty(),
                "empty set for {utterance:?}"
            );
        }
    }

    #[test]
    fn test_tone_intensity_is_fixed_per_value() {
        let directives = parse("make it more aggressive", &no_context());
        assert_eq!(
            directives[0],
            RefinementDirective::Tone {
                value: ToneValue::Aggressive,
                intensity: 4
            }
        );
    }

    #[test]
    fn test_add_section_captures_name() {
        let directives = parse("please add a certifications section", &no_context());
        assert!(directives.iter().any(|d| matches!(
            d,
            RefinementDirective::Structure(StructureChange::AddSection { section }) if section == "a certifications"
        )));
    }

    #[test]
    fn test_remove_section_captures_name() {
        let directives = parse("remove the hobbies section", &no_context());
        assert!(directives.iter().any(|d| matches!(
            d,
            RefinementDirective::Structure(StructureChange::RemoveSection { section }) if section == "the hobbies"
        )));
    }

    #[test]
    fn test_page_limit_captures_number() {
        let directives = parse("make it 2 pages", &no_context());
        assert!(directives.iter().any(|d| matches!(
            d,
            RefinementDirective::Structure(StructureChange::PageLimit { pages: 2 })
        )));
    }

    #[test]
    fn test_interview_points_is_format_request() {
        let directives = parse("generate interview prep for me", &no_context());
        assert!(directives.iter().any(|d| matches!(
            d,
            RefinementDirective::FormatRequest {
                format: DerivedFormat::InterviewPoints
            }
        )));
    }

    #[test]
    fn test_elevator_pitch_is_format_request() {
        let directives = parse("write an elevator pitch", &no_context());
        assert!(directives.iter().any(|d| matches!(
            d,
            RefinementDirective::FormatRequest {
                format: DerivedFormat::ElevatorPitch
            }
        )));
    }

    #[test]
    fn test_focus_pattern_captures_theme_verbatim() {
        let directives = parse("highlight metrics throughout", &no_context());
        assert!(directives.iter().any(|d| matches!(
            d,
            RefinementDirective::Focus { target, value }
                if target == "quantification" && value == "metrics"
        )));
    }

    #[test]
    fn test_ambient_context_folded_in_as_focus() {
        let context = RefinementContext {
            target_role: Some("Platform Engineer".to_string()),
            target_industry: Some("fintech".to_string()),
        };
        let directives = parse("tighten the summary", &context);
        assert!(directives.iter().any(|d| matches!(
            d,
            RefinementDirective::Focus { target, value }
                if target == "role" && value == "Platform Engineer"
        )));
        assert!(directives.iter().any(|d| matches!(
            d,
            RefinementDirective::Focus { target, value }
                if target == "industry" && value == "fintech"
        )));
    }

    #[test]
    fn test_context_folding_keeps_freeform_for_unmatched_utterance() {
        let context = RefinementContext {
            target_role: Some("Analyst".to_string()),
            target_industry: None,
        };
        let directives = parse("zhuzh it up", &context);
        assert!(directives
            .iter()
            .any(|d| matches!(d, RefinementDirective::Freeform { .. })));
        assert_eq!(directives.len(), 2);
    }

    #[test]
    fn test_priorities_order_tone_before_structure() {
        let tone = RefinementDirective::Tone {
            value: ToneValue::Concise,
            intensity: 4,
        };
        let structure = RefinementDirective::Structure(StructureChange::Simplify);
        assert!(tone.priority() < structure.priority());
    }
}
