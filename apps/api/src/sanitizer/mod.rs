//! Markup integrity repair for generative-service output.
//!
//! The generative service returns near-HTML with unclosed tags, fused
//! section markers, truncated list items, residual markdown, and the
//! occasional garbled word. `repair` runs a fixed pipeline of independent
//! string passes and returns a print-ready wrapped document plus a record of
//! what was fixed. It is total: any input, including an empty string, yields
//! a result — never an error.

pub mod passes;
pub mod recovery;
pub mod triage;

use tracing::{debug, warn};

use passes::{
    close_fused_headings, close_fused_list_items, close_open_lists, convert_residual_markdown,
    ensure_minimum_structure, normalize_whitespace, split_concatenated_headings,
};
use recovery::CorrectionTable;

/// Output of a repair invocation. Produced fresh every time; only `inner`
/// (the unwrapped markup) ever becomes part of a document state.
#[derive(Debug, Clone)]
pub struct SanitizationResult {
    /// Repaired markup wrapped in the print container, ready for rendering.
    pub html: String,
    /// Repaired markup without the wrapper.
    pub inner: String,
    pub warnings: Vec<String>,
    pub fixes_applied: u32,
}

const MIN_CONTENT_LEN: usize = 50;

/// Repairs raw markup with the default garbled-word correction table.
pub fn repair(raw: &str) -> SanitizationResult {
    repair_with(raw, &CorrectionTable::default())
}

/// Repairs raw markup with a caller-supplied correction table.
///
/// Pass order matters: heading closure and concatenation splitting must run
/// before the document is reflowed, markdown conversion must see original
/// line starts (so it runs before whitespace normalization, which glues
/// text onto tag boundaries), and the minimum-structure fallback must run
/// last so it sees the final shape of the document.
pub fn repair_with(raw: &str, corrections: &CorrectionTable) -> SanitizationResult {
    let mut warnings = Vec::new();
    let mut fixes = 0u32;

    if raw.trim().len() < MIN_CONTENT_LEN {
        warnings.push("Markup content is too short or empty".to_string());
    }

    let mut run = |outcome: passes::PassOutcome| -> String {
        fixes += outcome.fixes;
        warnings.extend(outcome.warnings);
        outcome.text
    };

    let text = run(close_fused_headings(raw));
    let text = run(split_concatenated_headings(&text));
    let text = run(close_fused_list_items(&text));
    let text = run(close_open_lists(&text));
    let text = run(convert_residual_markdown(&text));
    let text = normalize_whitespace(&text);
    let text = run(corrections.apply(&text));
    let inner = run(ensure_minimum_structure(&text));

    SanitizationResult {
        html: wrap_for_print(&inner),
        inner,
        warnings,
        fixes_applied: fixes,
    }
}

/// Logs a structure analysis of raw markup at debug level. Diagnostic only.
pub fn log_structure_analysis(raw: &str) {
    debug!(length = raw.len(), "markup structure analysis");

    let concat = passes::split_concatenated_headings(raw);
    if concat.fixes > 0 {
        warn!(count = concat.fixes, "concatenated section markers present");
    }

    let opens = (1..=6).map(|n| raw.matches(&format!("<h{n}>")).count()).sum::<usize>();
    let closes = (1..=6).map(|n| raw.matches(&format!("</h{n}>")).count()).sum::<usize>();
    if opens != closes {
        warn!(opens, closes, "heading tag imbalance");
    }
}

const FOOTER_ANCHOR: &str = "</div>\n</body>";

/// Injects a footer note into an already-wrapped document, inside the print
/// container so the fixed-position footer CSS applies.
pub fn append_footer(wrapped: &str, note: &str) -> String {
    let footer = format!(
        "<div class=\"cvforge-footer\">\n<hr>\n<p>{note}</p>\n</div>"
    );
    if wrapped.contains(FOOTER_ANCHOR) {
        wrapped.replace(FOOTER_ANCHOR, &format!("{footer}\n{FOOTER_ANCHOR}"))
    } else {
        format!("{wrapped}\n{footer}")
    }
}

/// Wraps repaired inner markup in the print-oriented container: typography,
/// block spacing, page-break-avoidance for headings and list items, and a
/// fixed footer region.
pub fn wrap_for_print(inner: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<style>
#cvforge-print-container {{
  font-family: 'Georgia', 'Times New Roman', serif;
  line-height: 1.5;
  font-size: 11pt;
  color: #333;
  max-width: 210mm;
  margin: 0 auto;
  padding: 20px;
  box-sizing: border-box;
}}
h1 {{ font-size: 18pt; margin: 0 0 10px; padding-bottom: 5px; border-bottom: 1px solid #eee; }}
h2 {{ font-size: 14pt; margin: 25px 0 10px; color: #2c3e50; border-bottom: 1px solid #e2e8f0; padding-bottom: 5px; }}
h3 {{ font-size: 12pt; margin: 20px 0 8px; color: #34495e; font-weight: bold; }}
p {{ margin: 8px 0 12px; text-align: justify; }}
ul, ol {{ margin: 10px 0 15px; padding-left: 25px; }}
li {{ margin-bottom: 6px; page-break-inside: avoid; }}
.page-break {{ page-break-before: always; }}
@media print {{
  body {{ margin: 0; padding: 0; }}
  #cvforge-print-container {{ padding: 15mm; }}
  h1, h2, h3, h4 {{ page-break-after: avoid; }}
  ul, ol, p, li {{ page-break-inside: avoid; }}
  .cvforge-footer {{ position: fixed; bottom: 10mm; left: 0; right: 0; text-align: center; }}
}}
</style>
</head>
<body>
<div id="cvforge-print-container">
{inner}
</div>
</body>
</html>"#
    )
}
