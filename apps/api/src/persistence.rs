//! Debounced document snapshot persistence.
//!
//! Mirrors each committed head to Postgres and archives a versioned copy of
//! the wrapped document to S3. Saving is idempotent: the head row carries a
//! content fingerprint, and re-saving an identical state is a no-op — which
//! is what lets callers fire saves from a background task without ordering
//! ceremony. Rows in `document_snapshots` are append-only; never UPDATE.

use anyhow::Result;
use aws_sdk_s3::primitives::ByteStream;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::document::{DocumentRow, DocumentSnapshotRow, DocumentState};
use crate::sanitizer::wrap_for_print;

/// Outcome of a snapshot attempt.
pub struct SavedSnapshot {
    pub version: i32,
    pub s3_key: String,
}

#[derive(Clone)]
pub struct SnapshotStore {
    pool: PgPool,
    s3: aws_sdk_s3::Client,
    bucket: String,
}

impl SnapshotStore {
    pub fn new(pool: PgPool, s3: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { pool, s3, bucket }
    }

    /// Persists the document head and archives a snapshot, unless the state
    /// is identical to what is already saved (returns `None` then).
    pub async fn save_snapshot(
        &self,
        document_id: Uuid,
        user_id: Uuid,
        state: &DocumentState,
    ) -> Result<Option<SavedSnapshot>> {
        let new_fingerprint = fingerprint(state);

        let existing: Option<String> =
            sqlx::query_scalar("SELECT fingerprint FROM documents WHERE id = $1")
                .bind(document_id)
                .fetch_optional(&self.pool)
                .await?;

        if existing.as_deref() == Some(new_fingerprint.as_str()) {
            return Ok(None);
        }

        sqlx::query(
            r#"
            INSERT INTO documents (id, user_id, markup, digital_summary, fingerprint, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (id) DO UPDATE
            SET markup = EXCLUDED.markup,
                digital_summary = EXCLUDED.digital_summary,
                fingerprint = EXCLUDED.fingerprint,
                updated_at = NOW()
            "#,
        )
        .bind(document_id)
        .bind(user_id)
        .bind(&state.markup)
        .bind(&state.digital_summary)
        .bind(&new_fingerprint)
        .execute(&self.pool)
        .await?;

        // Append-only snapshot version
        let current_max: Option<i32> = sqlx::query_scalar(
            "SELECT MAX(version) FROM document_snapshots WHERE document_id = $1",
        )
        .bind(document_id)
        .fetch_one(&self.pool)
        .await?;
        let version = current_max.unwrap_or(0) + 1;

        let s3_key = format!("documents/{document_id}/v{version}.html");
        self.s3
            .put_object()
            .bucket(&self.bucket)
            .key(&s3_key)
            .body(ByteStream::from(
                wrap_for_print(&state.markup).into_bytes(),
            ))
            .content_type("text/html")
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

        sqlx::query(
            "INSERT INTO document_snapshots (id, document_id, version, s3_key) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(document_id)
        .bind(version)
        .bind(&s3_key)
        .execute(&self.pool)
        .await?;

        info!("Archived document {document_id} snapshot v{version} to s3://{}/{s3_key}", self.bucket);

        Ok(Some(SavedSnapshot { version, s3_key }))
    }

    /// Returns all archived snapshot versions of a document, oldest first.
    pub async fn list_snapshots(&self, document_id: Uuid) -> Result<Vec<DocumentSnapshotRow>> {
        Ok(sqlx::query_as::<_, DocumentSnapshotRow>(
            "SELECT * FROM document_snapshots WHERE document_id = $1 ORDER BY version ASC",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Loads the persisted head row of a document, if any.
    pub async fn load_head(&self, document_id: Uuid) -> Result<Option<DocumentRow>> {
        Ok(
            sqlx::query_as::<_, DocumentRow>("SELECT * FROM documents WHERE id = $1")
                .bind(document_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }
}

/// Content fingerprint of a state. Timestamps are excluded on purpose:
/// identity is the content pair, so a re-commit of identical content
/// debounces to a no-op.
pub fn fingerprint(state: &DocumentState) -> String {
    let mut hasher = Sha256::new();
    hasher.update(state.markup.as_bytes());
    hasher.update([0u8]);
    hasher.update(state.digital_summary.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_ignores_timestamp() {
        let a = DocumentState::new("<p>x</p>", "summary");
        let mut b = DocumentState::new("<p>x</p>", "summary");
        b.created_at = b.created_at + chrono::Duration::days(1);
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_distinguishes_content() {
        let a = DocumentState::new("<p>x</p>", "summary");
        let b = DocumentState::new("<p>y</p>", "summary");
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_separates_fields() {
        // markup/summary boundary must matter: ("ab", "c") != ("a", "bc")
        let a = DocumentState::new("ab", "c");
        let b = DocumentState::new("a", "bc");
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }
}
