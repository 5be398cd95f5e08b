use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An immutable snapshot of a rendered document. Every edit (manual or
/// AI-driven) produces a new `DocumentState`; none is ever mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentState {
    /// Inner body markup — never the wrapped print document.
    pub markup: String,
    /// Short-form profile text, versioned in lockstep with `markup`.
    pub digital_summary: String,
    pub created_at: DateTime<Utc>,
}

impl DocumentState {
    pub fn new(markup: impl Into<String>, digital_summary: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            digital_summary: digital_summary.into(),
            created_at: Utc::now(),
        }
    }
}

/// Current persisted head of a document.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub markup: String,
    pub digital_summary: String,
    pub fingerprint: String,
    pub updated_at: DateTime<Utc>,
}

/// One archived document version, mirrored to object storage.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentSnapshotRow {
    pub id: Uuid,
    pub document_id: Uuid,
    pub version: i32,
    pub s3_key: String,
    pub created_at: DateTime<Utc>,
}
