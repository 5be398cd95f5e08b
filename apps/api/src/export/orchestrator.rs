//! Export orchestration.
//!
//! Drives repair → health check → render, and on any failure walks the
//! deterministic fallback chain. A `critical` health verdict skips
//! high-fidelity rendering entirely — it is expected to fail or produce an
//! unusable artifact. The orchestrator never retries rendering and never
//! dead-ends: short of a document with no scannable content at all, the
//! user always receives a usable artifact.

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::export::outcome::ExportOutcome;
use crate::export::renderers::{
    export_filename, plain_text_artifact, word_document_artifact, PdfRenderer,
};
use crate::models::document::DocumentState;
use crate::sanitizer::triage::{self, HealthReport, HealthVerdict, TriageThresholds};
use crate::sanitizer::{self, append_footer};

/// A deterministic fallback artifact, delivered inline.
#[derive(Debug, Clone, Serialize)]
pub struct TextArtifact {
    pub filename: String,
    pub content: String,
}

/// Terminal result of the export state machine.
#[derive(Debug)]
pub enum ExportArtifact {
    /// High-fidelity render succeeded.
    HighFidelity { filename: String, pdf: Bytes },
    /// Render failed or was skipped; both fallbacks offered in order of
    /// preference.
    Degraded {
        reason: String,
        plain_text: TextArtifact,
        word_document: TextArtifact,
    },
    /// No scannable content survived repair — nothing to export.
    Failed { reason: String },
}

/// Everything a caller needs to respond to an export request.
#[derive(Debug)]
pub struct ExportReport {
    pub artifact: ExportArtifact,
    pub outcome: ExportOutcome,
    pub health: HealthReport,
    pub warnings: Vec<String>,
}

/// Inputs that vary per export request.
pub struct ExportRequest<'a> {
    pub filename_hint: &'a str,
    /// Footer note appended inside the print container before rendering.
    pub branding_note: Option<&'a str>,
}

/// Runs one export attempt over the committed document state.
pub async fn run_export(
    state: &DocumentState,
    renderer: &dyn PdfRenderer,
    thresholds: &TriageThresholds,
    request: ExportRequest<'_>,
) -> ExportReport {
    debug!("export: repairing committed markup");
    let repaired = sanitizer::repair(&state.markup);

    debug!(
        fixes = repaired.fixes_applied,
        warnings = repaired.warnings.len(),
        "export: health-checking repaired markup"
    );
    let health = triage::score_with(&repaired.inner, thresholds);

    if health.verdict == HealthVerdict::Critical {
        warn!(
            signatures = health.signature_count,
            "export: critical health verdict, skipping high-fidelity render"
        );
        let reason = format!(
            "document health critical ({} anomaly signatures)",
            health.signature_count
        );
        return degrade(
            &repaired.inner,
            &repaired.warnings,
            repaired.fixes_applied,
            health,
            request.filename_hint,
            reason,
        );
    }

    let html = match request.branding_note {
        Some(note) => append_footer(&repaired.html, note),
        None => repaired.html.clone(),
    };

    debug!("export: attempting high-fidelity render");
    match renderer.render(&html, request.filename_hint).await {
        Ok(pdf) => {
            info!(bytes = pdf.len(), "export: high-fidelity render succeeded");
            ExportReport {
                artifact: ExportArtifact::HighFidelity {
                    filename: export_filename(request.filename_hint, "pdf"),
                    pdf,
                },
                outcome: ExportOutcome::success(
                    repaired.fixes_applied,
                    repaired.warnings.len() as u32,
                ),
                health,
                warnings: repaired.warnings,
            }
        }
        Err(e) => {
            warn!(error = %e, "export: high-fidelity render failed, degrading");
            degrade(
                &repaired.inner,
                &repaired.warnings,
                repaired.fixes_applied,
                health,
                request.filename_hint,
                e.to_string(),
            )
        }
    }
}

fn degrade(
    inner: &str,
    warnings: &[String],
    fixes_applied: u32,
    health: HealthReport,
    filename_hint: &str,
    reason: String,
) -> ExportReport {
    let plain = plain_text_artifact(inner);

    if plain.is_empty() {
        warn!("export: no scannable content, nothing to export");
        return ExportReport {
            artifact: ExportArtifact::Failed {
                reason: format!("{reason}; document has no scannable content"),
            },
            outcome: ExportOutcome::failure(fixes_applied, warnings.len() as u32, reason),
            health,
            warnings: warnings.to_vec(),
        };
    }

    let report = ExportReport {
        artifact: ExportArtifact::Degraded {
            reason: reason.clone(),
            plain_text: TextArtifact {
                filename: export_filename(filename_hint, "txt"),
                content: plain,
            },
            word_document: TextArtifact {
                filename: export_filename(filename_hint, "doc"),
                content: word_document_artifact(inner),
            },
        },
        outcome: ExportOutcome::failure(fixes_applied, warnings.len() as u32, reason),
        health,
        warnings: warnings.to_vec(),
    };
    info!("export: degraded artifacts prepared");
    report
}
