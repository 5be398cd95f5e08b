pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::documents::handlers as documents;
use crate::export::handlers as export;
use crate::ingest;
use crate::refinement::handlers as refinement;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Document sessions
        .route("/api/v1/documents", post(documents::handle_create_document))
        .route("/api/v1/documents/:id", get(documents::handle_get_document))
        .route(
            "/api/v1/documents/:id/snapshots",
            get(documents::handle_list_snapshots),
        )
        .route("/api/v1/documents/:id/undo", post(documents::handle_undo))
        .route("/api/v1/documents/:id/redo", post(documents::handle_redo))
        .route(
            "/api/v1/documents/:id/cancel",
            post(documents::handle_cancel),
        )
        // Refinement
        .route(
            "/api/v1/documents/:id/refine",
            post(refinement::handle_refine),
        )
        .route("/api/v1/refine/presets", get(refinement::handle_presets))
        // Export
        .route(
            "/api/v1/documents/:id/export",
            post(export::handle_export),
        )
        .route(
            "/api/v1/documents/:id/export/outcomes",
            get(export::handle_outcomes),
        )
        // Upload text extraction
        .route("/api/v1/ingest", post(ingest::handle_ingest))
        .with_state(state)
}
