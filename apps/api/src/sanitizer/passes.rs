//! Individual repair passes over near-HTML markup.
//!
//! Each pass is an independent pure function `&str -> PassOutcome`. None of
//! them parse the input into a tree — the generative service's output is
//! routinely too malformed for a strict parser, so every pass is a linear
//! text scan. `sanitizer::repair` composes them in a fixed order; later
//! passes assume earlier ones have normalized the common cases.

use std::sync::LazyLock;

use regex::Regex;

/// Result of a single repair pass.
#[derive(Debug, Clone)]
pub struct PassOutcome {
    pub text: String,
    pub fixes: u32,
    pub warnings: Vec<String>,
}

impl PassOutcome {
    fn unchanged(text: String) -> Self {
        Self {
            text,
            fixes: 0,
            warnings: Vec::new(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pass 1: heading/paragraph fusion
// ────────────────────────────────────────────────────────────────────────────

static HEADING_FUSION_CHAIN: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        // h1 missing its closing tag
        (Regex::new(r"<h1>([^<]+)<h2>").unwrap(), "<h1>$1</h1>\n<h2>"),
        (Regex::new(r"<h1>([^<]+)<p>").unwrap(), "<h1>$1</h1>\n<p>"),
        // h2 missing its closing tag
        (Regex::new(r"<h2>([^<]+)<h3>").unwrap(), "<h2>$1</h2>\n<h3>"),
        (Regex::new(r"<h2>([^<]+)<p>").unwrap(), "<h2>$1</h2>\n<p>"),
        (Regex::new(r"<h2>([^<]+)<ul>").unwrap(), "<h2>$1</h2>\n<ul>"),
        // h3 missing its closing tag
        (Regex::new(r"<h3>([^<]+)<p>").unwrap(), "<h3>$1</h3>\n<p>"),
    ]
});

/// Closes headings that run straight into the next block tag
/// (`<h1>Jane Doe<h2>PROFILE</h2>` → `<h1>Jane Doe</h1>\n<h2>PROFILE</h2>`).
pub fn close_fused_headings(input: &str) -> PassOutcome {
    let mut text = input.to_string();
    let mut fixes = 0u32;

    for (pattern, replacement) in HEADING_FUSION_CHAIN.iter() {
        let count = pattern.find_iter(&text).count() as u32;
        if count > 0 {
            fixes += count;
            text = pattern.replace_all(&text, *replacement).into_owned();
        }
    }

    PassOutcome {
        text,
        fixes,
        warnings: Vec::new(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pass 2: token-concatenation (markdown header fused onto prior sentence)
// ────────────────────────────────────────────────────────────────────────────

static CONCATENATED_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-zA-Z0-9\s&]+)(#{2,})([A-Z][a-zA-Z\s]+)").unwrap());

/// Splits `...Financial Analyst##PROFESSIONAL PROFILE...` into a closed
/// heading boundary: `...Financial Analyst</h2>\n<h2>PROFESSIONAL PROFILE...`.
pub fn split_concatenated_headings(input: &str) -> PassOutcome {
    let count = CONCATENATED_HEADING.find_iter(input).count() as u32;
    if count == 0 {
        return PassOutcome::unchanged(input.to_string());
    }

    let text = CONCATENATED_HEADING
        .replace_all(input, "${1}</h2>\n<h2>${3}")
        .into_owned();

    PassOutcome {
        text,
        fixes: count,
        warnings: vec![format!("Found {count} concatenated headings")],
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pass 3: list-item fusion
// ────────────────────────────────────────────────────────────────────────────

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

const FUSED_ITEM_MIN_LEN: usize = 50;

/// Inserts the missing `</li>` when a long inline run inside a list item
/// (inline tags like `<strong>` included) runs directly into another `<li>`
/// with no closing tag in between. Short runs are left alone — they are more
/// likely nested-markup noise than a truncated item.
pub fn close_fused_list_items(input: &str) -> PassOutcome {
    let opens: Vec<usize> = input.match_indices("<li>").map(|(i, _)| i).collect();

    let mut insert_at = Vec::new();
    for pair in opens.windows(2) {
        let segment = &input[pair[0] + 4..pair[1]];
        let visible = ANY_TAG.replace_all(segment, "");
        if !segment.contains("</li>") && visible.trim().len() >= FUSED_ITEM_MIN_LEN {
            insert_at.push(pair[1]);
        }
    }

    if insert_at.is_empty() {
        return PassOutcome::unchanged(input.to_string());
    }

    let mut text = String::with_capacity(input.len() + insert_at.len() * 6);
    let mut last = 0;
    for &pos in &insert_at {
        text.push_str(&input[last..pos]);
        text.push_str("</li>\n");
        last = pos;
    }
    text.push_str(&input[last..]);

    PassOutcome {
        text,
        fixes: insert_at.len() as u32,
        warnings: Vec::new(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pass 4: list closure
// ────────────────────────────────────────────────────────────────────────────

/// Appends missing `</ul>` / `</ol>` tags when open-tag counts exceed
/// close-tag counts.
pub fn close_open_lists(input: &str) -> PassOutcome {
    let mut text = input.to_string();
    let mut fixes = 0u32;
    let mut warnings = Vec::new();

    for tag in ["ul", "ol"] {
        let opens = text.matches(&format!("<{tag}>")).count();
        let closes = text.matches(&format!("</{tag}>")).count();
        if opens > closes {
            let missing = opens - closes;
            for _ in 0..missing {
                text.push_str(&format!("</{tag}>"));
            }
            fixes += missing as u32;
            warnings.push(format!("Added {missing} missing </{tag}> tag(s)"));
        }
    }

    PassOutcome {
        text,
        fixes,
        warnings,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pass 5: whitespace normalization
// ────────────────────────────────────────────────────────────────────────────

static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static SPACE_BEFORE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+<").unwrap());
static SPACE_AFTER_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">\s+").unwrap());
static ADJACENT_HEADINGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</h([1-6])><h([1-6])>").unwrap());

/// Collapses newline runs, trims whitespace against tag boundaries, and
/// forces a line break between adjacent heading tags.
///
/// Contributes zero fixes: these normalizations run on every invocation (the
/// strip-then-reinsert around headings is stable but re-executes), so
/// counting them would report phantom fixes on already-clean input.
pub fn normalize_whitespace(input: &str) -> String {
    let text = EXCESS_NEWLINES.replace_all(input, "\n\n");
    let text = SPACE_BEFORE_TAG.replace_all(&text, "<");
    let text = SPACE_AFTER_TAG.replace_all(&text, ">");
    ADJACENT_HEADINGS
        .replace_all(&text, "</h$1>\n<h$2>")
        .into_owned()
}

// ────────────────────────────────────────────────────────────────────────────
// Pass 6: residual markdown conversion
// ────────────────────────────────────────────────────────────────────────────

static MD_H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").unwrap());
static MD_H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^##\s+(.+)$").unwrap());
static MD_H3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^###\s+(.+)$").unwrap());

/// Converts markdown headers that survived tag generation entirely
/// (`## EXPERIENCE` at start-of-line) into the corresponding heading tags.
pub fn convert_residual_markdown(input: &str) -> PassOutcome {
    let mut text = input.to_string();
    let mut fixes = 0u32;

    // `#\s` cannot match a `##` line, so conversion order is safe.
    for (pattern, replacement) in [
        (&*MD_H1, "<h1>$1</h1>"),
        (&*MD_H2, "<h2>$1</h2>"),
        (&*MD_H3, "<h3>$1</h3>"),
    ] {
        let count = pattern.find_iter(&text).count() as u32;
        if count > 0 {
            fixes += count;
            text = pattern.replace_all(&text, replacement).into_owned();
        }
    }

    PassOutcome {
        text,
        fixes,
        warnings: Vec::new(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pass 8: minimum-structure fallback
// ────────────────────────────────────────────────────────────────────────────

const MIN_UNSTRUCTURED_LEN: usize = 100;
const MIN_LINE_LEN: usize = 10;

/// If the document has no heading and no paragraph tag at all but non-trivial
/// length, wraps each substantial line in a paragraph tag so the renderer
/// always receives at least paragraph-level structure.
pub fn ensure_minimum_structure(input: &str) -> PassOutcome {
    let has_structure = input.contains("<h") || input.contains("<p");
    if has_structure || input.len() <= MIN_UNSTRUCTURED_LEN {
        return PassOutcome::unchanged(input.to_string());
    }

    let text = input
        .lines()
        .filter(|l| l.trim().len() > MIN_LINE_LEN)
        .map(|l| format!("<p>{}</p>", l.trim()))
        .collect::<Vec<_>>()
        .join("\n");

    PassOutcome {
        text,
        fixes: 1,
        warnings: vec!["Added minimal paragraph structure".to_string()],
    }
}
