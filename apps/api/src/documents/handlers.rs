//! Axum route handlers for document sessions.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::documents::session::DocumentSession;
use crate::errors::AppError;
use crate::history::HistoryBoundary;
use crate::models::contact::{find_missing_contact_fields, inject_contact_data, ContactData};
use crate::models::document::{DocumentSnapshotRow, DocumentState};
use crate::refinement::intent::RefinementContext;
use crate::sanitizer::{self, triage};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub user_id: Uuid,
    /// Raw markup from the generative service or a manual paste.
    pub markup: String,
    #[serde(default)]
    pub digital_summary: String,
    #[serde(default)]
    pub target_role: Option<String>,
    #[serde(default)]
    pub target_industry: Option<String>,
    #[serde(default)]
    pub contact: Option<ContactData>,
}

#[derive(Debug, Serialize)]
pub struct CreateDocumentResponse {
    pub document_id: Uuid,
    pub health: triage::HealthReport,
    pub warnings: Vec<String>,
    pub fixes_applied: u32,
    pub missing_contact_fields: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct DocumentDetailResponse {
    pub document_id: Uuid,
    pub markup: String,
    pub digital_summary: String,
    pub health: triage::HealthReport,
    pub can_undo: bool,
    pub can_redo: bool,
    pub history_len: usize,
}

#[derive(Debug, Serialize)]
pub struct HistoryMoveResponse {
    /// "ok" when the cursor moved; "at_history_start" / "at_history_end"
    /// when it was already at the boundary. Boundaries are affordance
    /// signals, not errors.
    pub status: &'static str,
    pub markup: Option<String>,
    pub digital_summary: Option<String>,
    pub can_undo: bool,
    pub can_redo: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/documents
///
/// Opens a document session from raw markup: repair → health check → first
/// committed state. The stored state is the repaired inner markup, never the
/// raw service output.
pub async fn handle_create_document(
    State(state): State<AppState>,
    Json(request): Json<CreateDocumentRequest>,
) -> Result<Json<CreateDocumentResponse>, AppError> {
    if request.markup.trim().is_empty() {
        return Err(AppError::Validation("markup cannot be empty".to_string()));
    }

    sanitizer::log_structure_analysis(&request.markup);

    let contact = request.contact.unwrap_or_default();
    let injected = inject_contact_data(&request.markup, &contact);
    let repaired = sanitizer::repair(&injected);
    let health = triage::score_with(&repaired.inner, &state.config.triage);
    let missing_contact_fields = find_missing_contact_fields(&repaired.inner);

    let document_state = DocumentState::new(repaired.inner, request.digital_summary);
    let context = RefinementContext {
        target_role: request.target_role,
        target_industry: request.target_industry,
    };

    let document_id = state
        .sessions
        .create(request.user_id, document_state.clone(), context, contact)
        .await;

    spawn_snapshot(&state, document_id, request.user_id, document_state);

    Ok(Json(CreateDocumentResponse {
        document_id,
        health,
        warnings: repaired.warnings,
        fixes_applied: repaired.fixes_applied,
        missing_contact_fields,
    }))
}

/// GET /api/v1/documents/:id
///
/// Current state plus a freshly computed health verdict. Health is derived,
/// never stored, so this always reflects the markup as it is now. A session
/// lost to a restart is rehydrated from the persisted head.
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<DocumentDetailResponse>, AppError> {
    if let Ok(response) = detail_from_session(&state, document_id).await {
        return Ok(Json(response));
    }

    // No live session — fall back to the persisted head, if one exists.
    let row = state
        .snapshots
        .load_head(document_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("Document {document_id}")))?;

    let head = DocumentState {
        markup: row.markup,
        digital_summary: row.digital_summary,
        created_at: row.updated_at,
    };
    state
        .sessions
        .restore(document_id, row.user_id, head)
        .await;

    let response = detail_from_session(&state, document_id).await?;
    Ok(Json(response))
}

async fn detail_from_session(
    state: &AppState,
    document_id: Uuid,
) -> Result<DocumentDetailResponse, AppError> {
    let thresholds = state.config.triage;
    let response = state
        .sessions
        .with_session(document_id, move |session| {
            let current = session
                .history
                .current()
                .cloned()
                .unwrap_or_else(|| DocumentState::new("", ""));
            DocumentDetailResponse {
                document_id,
                health: triage::score_with(&current.markup, &thresholds),
                markup: current.markup,
                digital_summary: current.digital_summary,
                can_undo: session.history.can_undo(),
                can_redo: session.history.can_redo(),
                history_len: session.history.len(),
            }
        })
        .await?;
    Ok(response)
}

/// GET /api/v1/documents/:id/snapshots
///
/// Archived snapshot versions of the document, oldest first.
pub async fn handle_list_snapshots(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<Vec<DocumentSnapshotRow>>, AppError> {
    let snapshots = state
        .snapshots
        .list_snapshots(document_id)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(snapshots))
}

/// POST /api/v1/documents/:id/undo
pub async fn handle_undo(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<HistoryMoveResponse>, AppError> {
    let moved = state.sessions.undo(document_id).await?;
    respond_to_move(&state, document_id, moved).await
}

/// POST /api/v1/documents/:id/redo
pub async fn handle_redo(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<HistoryMoveResponse>, AppError> {
    let moved = state.sessions.redo(document_id).await?;
    respond_to_move(&state, document_id, moved).await
}

/// POST /api/v1/documents/:id/cancel
///
/// Cancels any in-flight refinement or export; a result that later arrives
/// for the cancelled operation is discarded, never committed.
pub async fn handle_cancel(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.sessions.cancel(document_id).await?;
    Ok(Json(serde_json::json!({ "status": "cancelled" })))
}

async fn respond_to_move(
    state: &AppState,
    document_id: Uuid,
    moved: Result<DocumentState, HistoryBoundary>,
) -> Result<Json<HistoryMoveResponse>, AppError> {
    let (can_undo, can_redo, user_id, current) = state
        .sessions
        .with_session(document_id, |session: &mut DocumentSession| {
            (
                session.history.can_undo(),
                session.history.can_redo(),
                session.user_id,
                session.history.current().cloned(),
            )
        })
        .await?;

    let response = match moved {
        Ok(new_current) => {
            // The cursor moved; persist the now-current state (idempotent,
            // so a redo back to a saved state is a no-op).
            if let Some(current) = current {
                spawn_snapshot(state, document_id, user_id, current);
            }
            HistoryMoveResponse {
                status: "ok",
                markup: Some(new_current.markup),
                digital_summary: Some(new_current.digital_summary),
                can_undo,
                can_redo,
            }
        }
        Err(HistoryBoundary::AtHistoryStart) => HistoryMoveResponse {
            status: "at_history_start",
            markup: None,
            digital_summary: None,
            can_undo,
            can_redo,
        },
        Err(HistoryBoundary::AtHistoryEnd) => HistoryMoveResponse {
            status: "at_history_end",
            markup: None,
            digital_summary: None,
            can_undo,
            can_redo,
        },
    };

    Ok(Json(response))
}

/// Fires a debounced background snapshot save. Persistence failures are
/// logged, not surfaced — local state remains authoritative for the session.
pub fn spawn_snapshot(
    state: &AppState,
    document_id: Uuid,
    user_id: Uuid,
    document_state: DocumentState,
) {
    let snapshots = state.snapshots.clone();
    tokio::spawn(async move {
        match snapshots
            .save_snapshot(document_id, user_id, &document_state)
            .await
        {
            Ok(Some(saved)) => tracing::debug!(
                "archived document {document_id} v{} at {}",
                saved.version,
                saved.s3_key
            ),
            Ok(None) => {} // identical state, save debounced to a no-op
            Err(e) => {
                tracing::warn!("snapshot save failed for document {document_id}: {e:#}");
            }
        }
    });
}
