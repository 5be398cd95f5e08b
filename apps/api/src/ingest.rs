//! Upload text-extraction boundary.
//!
//! The pipeline consumes uploads only as `extract -> plain text`; everything
//! downstream works on the text. PDF extraction is CPU-bound and runs inside
//! `tokio::task::spawn_blocking`. DOCX is not supported server-side — the
//! client converts before upload.

use axum::extract::Multipart;
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub filename: String,
    pub text: String,
    pub characters: usize,
}

/// POST /api/v1/ingest
///
/// Accepts one multipart `file` field and returns its extracted plain text.
pub async fn handle_ingest(mut multipart: Multipart) -> Result<Json<IngestResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .ok_or_else(|| AppError::Validation("Upload is missing a filename".to_string()))?
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        let text = extract_text(&filename, bytes).await?;
        info!(filename, characters = text.len(), "extracted upload text");

        return Ok(Json(IngestResponse {
            characters: text.chars().count(),
            filename,
            text,
        }));
    }

    Err(AppError::Validation(
        "Request contained no 'file' field".to_string(),
    ))
}

/// Extracts plain text from an uploaded file based on its extension.
pub async fn extract_text(filename: &str, bytes: Bytes) -> Result<String, AppError> {
    match extension_of(filename).as_str() {
        "pdf" => {
            let text = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_from_mem(&bytes)
            })
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}"))
            })?
            .map_err(|e| AppError::Validation(format!("Could not extract PDF text: {e}")))?;
            Ok(text)
        }
        "txt" | "md" | "text" => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        other => Err(AppError::Validation(format!(
            "Unsupported upload type '.{other}' — upload PDF or plain text"
        ))),
    }
}

fn extension_of(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}
