use std::sync::Arc;

use crate::config::Config;
use crate::documents::session::SessionRegistry;
use crate::export::renderers::PdfRenderer;
use crate::llm_client::Generator;
use crate::persistence::SnapshotStore;

/// Shared application state injected into all route handlers via Axum
/// extractors. Postgres and S3 are reached through `snapshots`, the only
/// consumer of either.
#[derive(Clone)]
pub struct AppState {
    /// Generative-service seam. Default: `LlmClient`; tests swap in mocks.
    pub generator: Arc<dyn Generator>,
    /// High-fidelity render seam. Default: `HttpPdfRenderer`.
    pub pdf_renderer: Arc<dyn PdfRenderer>,
    /// Live document sessions (history, locks, outcome logs).
    pub sessions: SessionRegistry,
    /// Debounced Postgres + S3 snapshot persistence.
    pub snapshots: SnapshotStore,
    pub config: Config,
}
