//! Document Scan Service
//!
//! Runs an uploaded document through a text extractor and the parser for the
//! requested document type, producing the OCR response that feeds form
//! reconciliation. Image OCR itself is an external collaborator plugged in
//! through `TextExtractor`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use setu_types::{OcrResponse, ScanRecord};
use tracing::{debug, info};

use super::detector::{detect_document_type, DocumentType};
use super::parsers::parse_document;
use crate::error::ScanError;

/// Status reported on every successful scan
pub const SCAN_SUCCESS_STATUS: &str = "success";

/// Requested document type that asks the scanner to detect it from the text
pub const AUTO_DETECT: &str = "auto";

/// An uploaded document
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Hex SHA-256 of the uploaded bytes
    pub fn sha256(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}

/// Turns a document into text (OCR engine, PDF text layer, ...)
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, upload: &DocumentUpload) -> Result<String, ScanError>;

    /// Extractor name for logs
    fn name(&self) -> &'static str;
}

/// Extractor for uploads that already are text (`text/*` mime types)
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract_text(&self, upload: &DocumentUpload) -> Result<String, ScanError> {
        if !upload.mime_type.starts_with("text/") {
            return Err(ScanError::Extraction {
                file_name: upload.file_name.clone(),
                reason: format!("no OCR engine configured for {}", upload.mime_type),
            });
        }
        String::from_utf8(upload.bytes.clone()).map_err(|e| ScanError::Extraction {
            file_name: upload.file_name.clone(),
            reason: e.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "plain-text"
    }
}

/// Directory of `<file stem>_scan.json` records
#[derive(Debug, Clone)]
pub struct ScanArchive {
    dir: PathBuf,
}

impl ScanArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Archive path for an uploaded file name
    pub fn record_path(&self, file_name: &str) -> PathBuf {
        let stem = Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "document".to_string());
        self.dir.join(format!("{}_scan.json", stem))
    }

    /// Write a record as pretty JSON, replacing any earlier scan of the same file
    pub async fn store(&self, record: &ScanRecord) -> Result<PathBuf, ScanError> {
        let path = self.record_path(&record.file_name);
        let json = serde_json::to_string_pretty(record)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ScanError::Archive {
                path: self.dir.clone(),
                source,
            })?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| ScanError::Archive {
                path: path.clone(),
                source,
            })?;

        debug!("Archived scan of {} to {:?}", record.file_name, path);
        Ok(path)
    }
}

/// Scans uploads into OCR responses
#[derive(Clone)]
pub struct DocumentScanService {
    extractor: Arc<dyn TextExtractor>,
    archive: Option<ScanArchive>,
}

impl DocumentScanService {
    pub fn new(extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            extractor,
            archive: None,
        }
    }

    pub fn with_archive(mut self, archive: ScanArchive) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn archive(&self) -> Option<&ScanArchive> {
        self.archive.as_ref()
    }

    /// Scan an upload as the requested document type
    ///
    /// `document_type` may be `"auto"` to detect the type from the text.
    pub async fn scan(
        &self,
        upload: &DocumentUpload,
        document_type: Option<&str>,
    ) -> Result<OcrResponse, ScanError> {
        let requested = document_type.map(str::trim).filter(|t| !t.is_empty());
        let Some(requested) = requested else {
            return Err(ScanError::MissingInput);
        };
        if upload.file_name.trim().is_empty() || upload.bytes.is_empty() {
            return Err(ScanError::MissingInput);
        }

        let explicit = if requested == AUTO_DETECT {
            None
        } else {
            Some(requested.parse::<DocumentType>()?)
        };

        let text = self.extractor.extract_text(upload).await?;
        debug!(
            "{} extracted {} characters from {}",
            self.extractor.name(),
            text.len(),
            upload.file_name
        );

        let document_type = match explicit {
            Some(doc_type) => doc_type,
            None => detect_document_type(&text).parse::<DocumentType>()?,
        };

        let response = OcrResponse::new(
            SCAN_SUCCESS_STATUS,
            document_type.as_str(),
            parse_document(document_type, &text),
        );

        if let Some(archive) = &self.archive {
            let record = ScanRecord {
                file_name: upload.file_name.clone(),
                sha256: upload.sha256(),
                document_type: document_type.to_string(),
                response: response.clone(),
                scanned_at: Utc::now(),
            };
            archive.store(&record).await?;
        }

        info!(
            "Scanned {} as {} ({} fields)",
            upload.file_name,
            document_type,
            response.extracted_data.as_ref().map_or(0, |d| d.len())
        );
        Ok(response)
    }
}

impl std::fmt::Debug for DocumentScanService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentScanService")
            .field("extractor", &self.extractor.name())
            .field("archive", &self.archive)
            .finish()
    }
}
