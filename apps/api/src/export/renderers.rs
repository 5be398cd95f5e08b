//! Export render targets.
//!
//! High-fidelity PDF rendering is an external collaborator behind the
//! `PdfRenderer` trait — the production implementation posts the wrapped
//! document to a render service. The two fallback artifacts (plain text and
//! a legacy word-processor-compatible document) are deterministic pure
//! functions owned here, so a degraded export can never itself fail.

use std::sync::LazyLock;

use async_trait::async_trait;
use bytes::Bytes;
use regex::Regex;
use serde_json::json;
use thiserror::Error;

/// High-fidelity render failure. Caught at the orchestrator boundary and
/// converted into a degraded export — never surfaced as an unhandled error.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("render service error (status {status}): {message}")]
    Service { status: u16, message: String },

    #[error("render service returned an empty artifact")]
    EmptyArtifact,
}

/// External high-fidelity renderer: `(html, filename_hint) -> pdf bytes`.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str, filename_hint: &str) -> Result<Bytes, RenderError>;
}

/// Production renderer: posts the wrapped document to the configured render
/// service and returns the PDF bytes.
pub struct HttpPdfRenderer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPdfRenderer {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint,
        }
    }
}

#[async_trait]
impl PdfRenderer for HttpPdfRenderer {
    async fn render(&self, html: &str, filename_hint: &str) -> Result<Bytes, RenderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "html": html, "filename": filename_hint }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RenderError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(RenderError::EmptyArtifact);
        }
        Ok(bytes)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Deterministic fallback artifacts
// ────────────────────────────────────────────────────────────────────────────

static LINE_BREAK_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</p>|</li>|</h[1-6]>|</ul>|</ol>|<br\s*/?>").unwrap());
static BULLET_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<li>").unwrap());
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static INLINE_SPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]{2,}").unwrap());

/// Extracts the scannable text content from body markup: block closes become
/// line breaks, list items become dashed lines, all remaining tags are
/// dropped, and basic entities are decoded.
pub fn plain_text_artifact(markup: &str) -> String {
    let text = LINE_BREAK_TAGS.replace_all(markup, "\n");
    let text = BULLET_OPEN.replace_all(&text, "- ");
    let text = ANY_TAG.replace_all(&text, "");
    let text = decode_entities(&text);
    let text = INLINE_SPACE_RUNS.replace_all(&text, " ");
    let text = BLANK_RUNS.replace_all(&text, "\n\n");

    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

/// Wraps body markup in the minimal Word-compatible HTML shell that legacy
/// word processors open natively. Styling is intentionally sparse — this is
/// the degraded artifact, not the high-fidelity one.
pub fn word_document_artifact(markup: &str) -> String {
    format!(
        r#"<html xmlns:o="urn:schemas-microsoft-com:office:office" xmlns:w="urn:schemas-microsoft-com:office:word">
<head>
<meta charset="utf-8">
<!--[if gte mso 9]><xml><w:WordDocument><w:View>Print</w:View></w:WordDocument></xml><![endif]-->
<style>
body {{ font-family: Georgia, 'Times New Roman', serif; font-size: 11pt; }}
h1 {{ font-size: 18pt; }}
h2 {{ font-size: 14pt; }}
h3 {{ font-size: 12pt; }}
</style>
</head>
<body>
{markup}
</body>
</html>"#
    )
}

/// Builds a safe artifact filename from a user-facing hint.
pub fn export_filename(hint: &str, extension: &str) -> String {
    let base: String = hint
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let base = if base.is_empty() {
        "CVForge_Export".to_string()
    } else {
        format!("CVForge_{base}")
    };
    format!("{base}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_preserves_content_order() {
        let markup = "<h1>Jane Doe</h1><h2>PROFILE</h2><p>Operations analyst.</p><ul><li>Cut costs 40%</li><li>Led team of 12</li></ul>";
        let text = plain_text_artifact(markup);
        let jane = text.find("Jane Doe").unwrap();
        let profile = text.find("PROFILE").unwrap();
        let costs = text.find("- Cut costs 40%").unwrap();
        assert!(jane < profile && profile < costs, "got:\n{text}");
        assert!(text.contains("- Led team of 12"));
        assert!(!text.contains('<'), "no tags may survive: {text}");
    }

    #[test]
    fn test_plain_text_decodes_entities() {
        let text = plain_text_artifact("<p>Research &amp; Development &#39;24</p>");
        assert!(text.contains("Research & Development '24"));
    }

    #[test]
    fn test_plain_text_of_empty_markup_is_empty() {
        assert!(plain_text_artifact("").is_empty());
        assert!(plain_text_artifact("<ul></ul>").is_empty());
    }

    #[test]
    fn test_plain_text_collapses_blank_runs() {
        let text = plain_text_artifact("<p>a</p>\n\n\n\n<p>b</p>");
        assert!(!text.contains("\n\n\n"));
    }

    #[test]
    fn test_word_document_embeds_markup_verbatim() {
        let doc = word_document_artifact("<h1>Jane</h1><p>Analyst</p>");
        assert!(doc.contains("<h1>Jane</h1><p>Analyst</p>"));
        assert!(doc.contains("schemas-microsoft-com:office:word"));
    }

    #[test]
    fn test_fallback_artifacts_are_writable_as_is() {
        // Degraded artifacts are handed to clients as file contents; make
        // sure filename and content round-trip through a real filesystem.
        let dir = tempfile::tempdir().unwrap();
        let markup = "<h1>Jane Doe</h1><p>Analyst</p>";

        let txt_path = dir.path().join(export_filename("Jane Doe", "txt"));
        std::fs::write(&txt_path, plain_text_artifact(markup)).unwrap();
        let doc_path = dir.path().join(export_filename("Jane Doe", "doc"));
        std::fs::write(&doc_path, word_document_artifact(markup)).unwrap();

        assert!(std::fs::read_to_string(txt_path)
            .unwrap()
            .contains("Jane Doe"));
        assert!(std::fs::read_to_string(doc_path)
            .unwrap()
            .contains("<h1>Jane Doe</h1>"));
    }

    #[test]
    fn test_export_filename_sanitizes_hint() {
        assert_eq!(
            export_filename("Senior Financial Analyst", "pdf"),
            "CVForge_Senior_Financial_Analyst.pdf"
        );
        assert_eq!(export_filename("", "txt"), "CVForge_Export.txt");
        assert_eq!(export_filename("a/b\\c", "doc"), "CVForge_a_b_c.doc");
    }
}
