//! Axum route handlers for natural-language refinement.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::documents::handlers::spawn_snapshot;
use crate::documents::session::CommitStatus;
use crate::errors::AppError;
use crate::models::contact::{find_missing_contact_fields, inject_contact_data};
use crate::models::document::DocumentState;
use crate::refinement::compiler::{compile, validate_response, DerivedArtifacts};
use crate::refinement::intent::{parse, RefinementDirective};
use crate::refinement::prompts::REFINEMENT_SYSTEM;
use crate::sanitizer::{self, triage};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    pub utterance: String,
}

#[derive(Debug, Serialize)]
pub struct RefineResponse {
    /// False when the operation was cancelled mid-flight and its result was
    /// discarded; history is unchanged in that case.
    pub applied: bool,
    pub digital_summary: String,
    pub change_log: Vec<String>,
    pub suggestions: Vec<String>,
    pub additional_formats: Option<DerivedArtifacts>,
    pub directives: Vec<RefinementDirective>,
    pub health: triage::HealthReport,
    pub warnings: Vec<String>,
    pub fixes_applied: u32,
    pub missing_contact_fields: Vec<&'static str>,
}

/// A canned refinement command offered by the UI as a one-click action.
#[derive(Debug, Clone, Serialize)]
pub struct QuickPreset {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub command: &'static str,
}

const QUICK_PRESETS: &[QuickPreset] = &[
    QuickPreset {
        id: "aggressive-tech",
        label: "Make Aggressive (Tech)",
        description: "Bold, metric-driven language",
        command: "Make it more aggressive for tech startup roles with strong metrics",
    },
    QuickPreset {
        id: "quantify-all",
        label: "Add Quantification",
        description: "Find and add numbers",
        command: "Quantify all achievements with percentages, dollar amounts, and time savings",
    },
    QuickPreset {
        id: "interview-prep",
        label: "Interview Points",
        description: "Generate talking points",
        command: "Create 5 interview talking points using STAR format",
    },
    QuickPreset {
        id: "simplify",
        label: "Simplify & Tighten",
        description: "Cut fluff, make concise",
        command: "Make it more concise and remove any unnecessary information",
    },
];

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/refine/presets
pub async fn handle_presets() -> Json<Vec<QuickPreset>> {
    Json(QUICK_PRESETS.to_vec())
}

/// POST /api/v1/documents/:id/refine
///
/// Full refinement pipeline: parse intent → compile prompt → generative call
/// → validate → repair → commit. All-or-nothing with respect to history: a
/// failed or cancelled attempt leaves the prior state untouched.
pub async fn handle_refine(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Json(request): Json<RefineRequest>,
) -> Result<Json<RefineResponse>, AppError> {
    if request.utterance.trim().is_empty() {
        return Err(AppError::Validation("utterance cannot be empty".to_string()));
    }

    // Exclusive operation: a second refinement or export on this document is
    // refused until this one completes.
    let ticket = state.sessions.begin_operation(document_id).await?;

    let (current, context, contact, user_id) = state
        .sessions
        .with_session(document_id, |session| {
            (
                session.history.current().cloned(),
                session.context.clone(),
                session.contact.clone(),
                session.user_id,
            )
        })
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

    let directives = parse(&request.utterance, &context);
    info!(
        document = %document_id,
        directives = directives.len(),
        "refinement intent parsed"
    );

    let prompt = compile(&directives, &current, &request.utterance, &context);

    // Only the generative call can fail from here; on failure the session
    // lock is released and history is untouched.
    let refined = match state.generator.generate(&prompt, REFINEMENT_SYSTEM).await {
        Ok(value) => match validate_response(value, &directives) {
            Ok(refined) => refined,
            Err(e) => {
                state.sessions.finish_operation(ticket).await?;
                return Err(AppError::Generation(e));
            }
        },
        Err(e) => {
            state.sessions.finish_operation(ticket).await?;
            return Err(AppError::Generation(e));
        }
    };

    // The refined markup re-enters the repair/health pipeline like any other
    // generative output.
    let injected = inject_contact_data(&refined.markup, &contact);
    let repaired = sanitizer::repair(&injected);
    let health = triage::score_with(&repaired.inner, &state.config.triage);
    let missing_contact_fields = find_missing_contact_fields(&repaired.inner);

    let new_state = DocumentState::new(repaired.inner, refined.digital_summary.clone());
    let status = state
        .sessions
        .commit_result(ticket, new_state.clone())
        .await?;

    let applied = status == CommitStatus::Committed;
    if applied {
        spawn_snapshot(&state, document_id, user_id, new_state);
    } else {
        info!(document = %document_id, "refinement result discarded after cancellation");
    }

    Ok(Json(RefineResponse {
        applied,
        digital_summary: refined.digital_summary,
        change_log: refined.change_log,
        suggestions: refined.suggestions,
        additional_formats: refined.additional_formats,
        directives,
        health,
        warnings: repaired.warnings,
        fixes_applied: repaired.fixes_applied,
        missing_contact_fields,
    }))
}
