//! Directive prompt compiler.
//!
//! Turns a parsed directive set plus the current document into one prompt
//! for the generative service, and validates the structured response before
//! anyone treats it as a new document state. Directives are ordered by
//! priority but never dropped.

use serde::{Deserialize, Serialize};

use crate::llm_client::GenerationError;
use crate::models::document::DocumentState;
use crate::refinement::intent::{
    DerivedFormat, RefinementContext, RefinementDirective, StructureChange,
};
use crate::refinement::prompts::{
    format_instruction, focus_instruction, structure_instruction, tone_instruction,
    DEFAULT_SUGGESTIONS, OUTPUT_SHAPE, QUALITY_RULES, QUANTIFY_INSTRUCTION,
};

/// Bounded prefix of the current markup embedded in the prompt, to keep
/// request size under control on large documents.
const MARKUP_PREFIX_CHARS: usize = 3000;

/// Optional derived artifacts the service may return alongside the primary
/// document update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DerivedArtifacts {
    #[serde(default)]
    pub interview_points: Vec<String>,
    #[serde(default)]
    pub social_post: Option<String>,
    #[serde(default)]
    pub elevator_pitch: Option<String>,
    #[serde(default)]
    pub cover_letter_bullets: Vec<String>,
}

/// Validated refinement response. `markup` and `digital_summary` are
/// guaranteed non-empty; everything else is optional garnish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinedDocument {
    pub markup: String,
    pub digital_summary: String,
    #[serde(default)]
    pub additional_formats: Option<DerivedArtifacts>,
    #[serde(default)]
    pub change_log: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// One-line human-readable rendering of a directive, used in the prompt's
/// command list and as the default change-log entry.
pub fn describe_directive(directive: &RefinementDirective) -> String {
    match directive {
        RefinementDirective::Tone { value, intensity } => {
            format!("Change tone to {} (intensity: {intensity}/5)", value.as_str())
        }
        RefinementDirective::Focus { target, value } => format!("Focus on {target}: {value}"),
        RefinementDirective::Structure(change) => {
            let name = match change {
                StructureChange::AddSection { section } => format!("add {section} section"),
                StructureChange::RemoveSection { section } => format!("remove {section} section"),
                StructureChange::Reorder => "reorder sections".to_string(),
                StructureChange::PageLimit { pages } => format!("limit to {pages} page(s)"),
                StructureChange::Simplify => "simplify".to_string(),
                StructureChange::Expand => "expand".to_string(),
            };
            format!("Structural change: {name}")
        }
        RefinementDirective::Quantify => {
            "Add quantification and metrics to all achievements".to_string()
        }
        RefinementDirective::FormatRequest { format } => {
            let name = match format {
                DerivedFormat::InterviewPoints => "interview points",
                DerivedFormat::SocialPost => "social post",
                DerivedFormat::ElevatorPitch => "elevator pitch",
                DerivedFormat::CoverLetterBullets => "cover letter bullets",
            };
            format!("Generate additional format: {name}")
        }
        RefinementDirective::Freeform { utterance } => format!("Custom request: {utterance}"),
    }
}

fn directive_instructions(directive: &RefinementDirective) -> String {
    match directive {
        RefinementDirective::Tone { value, intensity } => tone_instruction(*value, *intensity),
        RefinementDirective::Focus { target, value } => focus_instruction(target, value),
        RefinementDirective::Structure(change) => structure_instruction(change),
        RefinementDirective::Quantify => QUANTIFY_INSTRUCTION.to_string(),
        RefinementDirective::FormatRequest { format } => format_instruction(*format).to_string(),
        // A freeform directive has no canned block; the raw utterance is
        // already embedded in the prompt header.
        RefinementDirective::Freeform { .. } => String::new(),
    }
}

/// Compiles a directive set into the full refinement prompt.
pub fn compile(
    directives: &[RefinementDirective],
    current: &DocumentState,
    utterance: &str,
    context: &RefinementContext,
) -> String {
    let mut ordered: Vec<&RefinementDirective> = directives.iter().collect();
    ordered.sort_by_key(|d| d.priority());

    let mut prompt = String::with_capacity(4096);
    prompt.push_str("Your task: transform the CV based on the user's commands.\n\n");

    prompt.push_str("CURRENT CV DIGITAL SUMMARY:\n");
    prompt.push_str(&current.digital_summary);
    prompt.push_str("\n\n");

    prompt.push_str("CURRENT CV BODY MARKUP:\n");
    prompt.push_str(&truncate_chars(&current.markup, MARKUP_PREFIX_CHARS));
    prompt.push_str("\n\n");

    prompt.push_str(&format!("USER'S ORIGINAL REQUEST: \"{utterance}\"\n\n"));

    prompt.push_str("PARSED COMMANDS TO APPLY:\n");
    for (i, directive) in ordered.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, describe_directive(directive)));
    }
    prompt.push('\n');

    if context.target_role.is_some() || context.target_industry.is_some() {
        prompt.push_str("ADDITIONAL CONTEXT:\n");
        if let Some(role) = &context.target_role {
            prompt.push_str(&format!("- Target Role: {role}\n"));
        }
        if let Some(industry) = &context.target_industry {
            prompt.push_str(&format!("- Target Industry: {industry}\n"));
        }
        prompt.push('\n');
    }

    prompt.push_str("APPLY THESE TRANSFORMATIONS:\n");
    for directive in &ordered {
        prompt.push_str(&directive_instructions(directive));
    }

    prompt.push('\n');
    prompt.push_str(OUTPUT_SHAPE);
    prompt.push_str("\n\n");
    prompt.push_str(QUALITY_RULES);

    prompt
}

/// Validates the generative response shape. Missing or empty required
/// fields are a `GenerationError` — the caller must not commit anything.
/// Missing optional fields get serviceable defaults.
pub fn validate_response(
    value: serde_json::Value,
    directives: &[RefinementDirective],
) -> Result<RefinedDocument, GenerationError> {
    let mut refined: RefinedDocument =
        serde_json::from_value(value).map_err(GenerationError::Parse)?;

    if refined.markup.trim().is_empty() {
        return Err(GenerationError::InvalidShape("markup".to_string()));
    }
    if refined.digital_summary.trim().is_empty() {
        return Err(GenerationError::InvalidShape("digital_summary".to_string()));
    }

    if refined.change_log.is_empty() {
        refined.change_log = directives
            .iter()
            .map(|d| format!("Applied: {}", describe_directive(d)))
            .collect();
    }
    if refined.suggestions.is_empty() {
        refined.suggestions = DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect();
    }

    Ok(refined)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refinement::intent::{parse, StructureChange, ToneValue};
    use serde_json::json;

    fn current_state() -> DocumentState {
        DocumentState::new(
            "<h1>Jane Doe</h1><h2>PROFILE</h2><p>Operations analyst.</p>",
            "Operations analyst with a decade of experience.",
        )
    }

    #[test]
    fn test_compile_embeds_document_and_utterance() {
        let context = RefinementContext::default();
        let directives = parse("make it more aggressive", &context);
        let prompt = compile(&directives, &current_state(), "make it more aggressive", &context);

        assert!(prompt.contains("Operations analyst with a decade of experience."));
        assert!(prompt.contains("<h1>Jane Doe</h1>"));
        assert!(prompt.contains("USER'S ORIGINAL REQUEST: \"make it more aggressive\""));
        assert!(prompt.contains("TONE ADJUSTMENT (aggressive)"));
    }

    #[test]
    fn test_compile_includes_output_shape_and_quality_rules() {
        let context = RefinementContext::default();
        let directives = parse("quantify everything", &context);
        let prompt = compile(&directives, &current_state(), "quantify everything", &context);

        assert!(prompt.contains("OUTPUT FORMAT (JSON ONLY):"));
        assert!(prompt.contains("NEVER use placeholders"));
        assert!(prompt.contains("QUANTIFICATION: Add metrics"));
    }

    #[test]
    fn test_compile_orders_high_priority_first() {
        let context = RefinementContext::default();
        let directives = vec![
            RefinementDirective::Structure(StructureChange::Simplify),
            RefinementDirective::Tone {
                value: ToneValue::Concise,
                intensity: 4,
            },
        ];
        let prompt = compile(&directives, &current_state(), "simplify and tighten", &context);

        let tone_pos = prompt.find("Change tone to concise").expect("tone listed");
        let structure_pos = prompt.find("Structural change").expect("structure listed");
        assert!(
            tone_pos < structure_pos,
            "high-priority tone must precede medium-priority structure"
        );
    }

    #[test]
    fn test_compile_truncates_large_markup() {
        let context = RefinementContext::default();
        let big = DocumentState::new("x".repeat(10_000), "summary");
        let directives = parse("make it shorter", &context);
        let prompt = compile(&directives, &big, "make it shorter", &context);
        // 3000-char prefix plus ellipsis, not the whole body
        assert!(!prompt.contains(&"x".repeat(3500)));
        assert!(prompt.contains(&format!("{}...", "x".repeat(10).as_str())));
    }

    #[test]
    fn test_compile_freeform_still_produces_usable_prompt() {
        let context = RefinementContext::default();
        let directives = parse("zhuzh it up", &context);
        let prompt = compile(&directives, &current_state(), "zhuzh it up", &context);
        assert!(prompt.contains("Custom request: zhuzh it up"));
        assert!(prompt.contains("OUTPUT FORMAT"));
    }

    #[test]
    fn test_compile_embeds_ambient_context() {
        let context = RefinementContext {
            target_role: Some("Data Engineer".to_string()),
            target_industry: Some("fintech".to_string()),
        };
        let directives = parse("tighten it", &context);
        let prompt = compile(&directives, &current_state(), "tighten it", &context);
        assert!(prompt.contains("Target Role: Data Engineer"));
        assert!(prompt.contains("Target Industry: fintech"));
    }

    // ── validate_response ───────────────────────────────────────────────────

    #[test]
    fn test_validate_accepts_complete_response() {
        let response = json!({
            "markup": "<h1>Jane</h1>",
            "digital_summary": "Sharpened the profile.",
            "change_log": ["Rewrote summary"],
            "suggestions": ["Add certifications"]
        });
        let refined = validate_response(response, &[]).expect("valid response");
        assert_eq!(refined.markup, "<h1>Jane</h1>");
        assert_eq!(refined.change_log, vec!["Rewrote summary"]);
    }

    #[test]
    fn test_validate_rejects_missing_markup() {
        let response = json!({
            "markup": "",
            "digital_summary": "something"
        });
        let err = validate_response(response, &[]).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidShape(field) if field == "markup"));
    }

    #[test]
    fn test_validate_rejects_absent_summary() {
        let response = json!({ "markup": "<p>x</p>" });
        assert!(validate_response(response, &[]).is_err());
    }

    #[test]
    fn test_validate_defaults_change_log_from_directives() {
        let directives = vec![RefinementDirective::Quantify];
        let response = json!({
            "markup": "<p>Updated with 40% metrics</p>",
            "digital_summary": "Quantified achievements."
        });
        let refined = validate_response(response, &directives).unwrap();
        assert_eq!(refined.change_log.len(), 1);
        assert!(refined.change_log[0].contains("quantification"));
        assert_eq!(refined.suggestions.len(), DEFAULT_SUGGESTIONS.len());
    }

    #[test]
    fn test_validate_parses_derived_artifacts() {
        let response = json!({
            "markup": "<p>x</p>",
            "digital_summary": "s",
            "additional_formats": {
                "interview_points": ["Led migration", "Cut costs 30%"],
                "elevator_pitch": "I help teams ship faster."
            }
        });
        let refined = validate_response(response, &[]).unwrap();
        let formats = refined.additional_formats.expect("artifacts present");
        assert_eq!(formats.interview_points.len(), 2);
        assert_eq!(
            formats.elevator_pitch.as_deref(),
            Some("I help teams ship faster.")
        );
        assert!(formats.social_post.is_none());
    }
}
