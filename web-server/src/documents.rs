//! Document scan endpoint
//!
//! Uploads arrive as JSON with base64 content. Responses are the bare OCR
//! Response on success and `{"detail": ...}` on failure.

use std::path::Path;

use axum::{extract::State, http::StatusCode, response::Json};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::warn;

use setu::scanner::DocumentUpload;
use setu::ScanError;
use setu_types::OcrResponse;

use crate::AppState;

pub const SCAN_USAGE: &str = "Use POST to scan a document. Send file and document_type.";

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub content_base64: Option<String>,
    pub document_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Detail {
    pub detail: String,
}

type DetailError = (StatusCode, Json<Detail>);

fn detail(status: StatusCode, message: impl Into<String>) -> DetailError {
    (
        status,
        Json(Detail {
            detail: message.into(),
        }),
    )
}

/// Mime type from the file extension when the client sends none
fn guess_mime_type(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("txt") => "text/plain",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// GET /api/documents/scan/
pub async fn scan_usage() -> Json<Detail> {
    Json(Detail {
        detail: SCAN_USAGE.to_string(),
    })
}

/// POST /api/documents/scan/
pub async fn scan_document(
    State(state): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> Result<Json<OcrResponse>, DetailError> {
    let (Some(file_name), Some(content)) = (req.file_name, req.content_base64) else {
        return Err(detail(
            StatusCode::BAD_REQUEST,
            ScanError::MissingInput.to_string(),
        ));
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(content.trim())
        .map_err(|_| detail(StatusCode::BAD_REQUEST, "File content is not valid base64."))?;

    let mime_type = req
        .mime_type
        .unwrap_or_else(|| guess_mime_type(&file_name).to_string());
    let upload = DocumentUpload::new(file_name, mime_type, bytes);

    state
        .scanner
        .scan(&upload, req.document_type.as_deref())
        .await
        .map(Json)
        .map_err(|e| {
            let status = match &e {
                ScanError::MissingInput | ScanError::InvalidDocumentType(_) => {
                    StatusCode::BAD_REQUEST
                }
                ScanError::Extraction { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                ScanError::Archive { .. } | ScanError::Serialization(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            warn!("Scan of {} failed: {}", upload.file_name, e);
            detail(status, e.to_string())
        })
}
