//! Identity document scanning
//!
//! Turns an uploaded document into the `OcrResponse` that form
//! reconciliation consumes: text extraction, type detection and the
//! per-type field parsers.

pub mod dates;
pub mod detector;
pub mod parsers;
pub mod service;

pub use detector::{detect_document_type, DocumentType};
pub use parsers::parse_document;
pub use service::{
    DocumentScanService, DocumentUpload, PlainTextExtractor, ScanArchive, TextExtractor,
    AUTO_DETECT, SCAN_SUCCESS_STATUS,
};
