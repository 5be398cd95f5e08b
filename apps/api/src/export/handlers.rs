//! Axum route handlers for export.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::orchestrator::{run_export, ExportArtifact, ExportRequest};
use crate::export::outcome::ExportOutcome;
use crate::state::AppState;

const BRANDING_NOTE: &str = "Prepared with CVForge — precision-engineered career documents.";

#[derive(Debug, Deserialize, Default)]
pub struct ExportRequestDto {
    #[serde(default)]
    pub filename_hint: Option<String>,
    #[serde(default)]
    pub include_branding_footer: bool,
}

/// POST /api/v1/documents/:id/export
///
/// Runs the export pipeline over the committed state. A successful
/// high-fidelity render streams PDF bytes; a degraded export returns both
/// fallback artifacts inline so the client always gets something usable.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Json(request): Json<ExportRequestDto>,
) -> Result<Response, AppError> {
    let ticket = state.sessions.begin_operation(document_id).await?;

    let current = state
        .sessions
        .with_session(document_id, |session| session.history.current().cloned())
        .await?;
    let current = match current {
        Some(current) => current,
        None => {
            state.sessions.finish_operation(ticket).await?;
            return Err(AppError::Validation(
                "document has no committed state".to_string(),
            ));
        }
    };

    let filename_hint = request.filename_hint.as_deref().unwrap_or("CV");
    let report = run_export(
        &current,
        state.pdf_renderer.as_ref(),
        &state.config.triage,
        ExportRequest {
            filename_hint,
            branding_note: request.include_branding_footer.then_some(BRANDING_NOTE),
        },
    )
    .await;

    state
        .sessions
        .record_outcome(document_id, report.outcome.clone())
        .await?;
    state.sessions.finish_operation(ticket).await?;

    let response = match report.artifact {
        ExportArtifact::HighFidelity { filename, pdf } => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            pdf,
        )
            .into_response(),
        ExportArtifact::Degraded {
            reason,
            plain_text,
            word_document,
        } => Json(json!({
            "status": "degraded",
            "reason": reason,
            "health": report.health,
            "warnings": report.warnings,
            "fallbacks": [
                {
                    "kind": "plain_text",
                    "filename": plain_text.filename,
                    "content": plain_text.content,
                },
                {
                    "kind": "word_document",
                    "filename": word_document.filename,
                    "content": word_document.content,
                },
            ],
        }))
        .into_response(),
        ExportArtifact::Failed { reason } => Json(json!({
            "status": "failed",
            "reason": reason,
            "health": report.health,
            "warnings": report.warnings,
        }))
        .into_response(),
    };

    Ok(response)
}

/// GET /api/v1/documents/:id/export/outcomes
///
/// The session's diagnostic ring buffer of recent export attempts.
pub async fn handle_outcomes(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<Vec<ExportOutcome>>, AppError> {
    let outcomes = state
        .sessions
        .with_session(document_id, |session| session.outcomes.recent())
        .await?;
    Ok(Json(outcomes))
}
