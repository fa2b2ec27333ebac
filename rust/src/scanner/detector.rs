//! Document Type Detector
//!
//! Keyword-based detection of the document type from OCR text, plus the set of
//! document types the scanner has parsers for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Document types with a registered parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Citizenship,
    Passport,
    Pan,
    DrivingLicense,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::Citizenship,
        DocumentType::Passport,
        DocumentType::Pan,
        DocumentType::DrivingLicense,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Citizenship => "citizenship",
            DocumentType::Passport => "passport",
            DocumentType::Pan => "pan",
            DocumentType::DrivingLicense => "driving_license",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ScanError::InvalidDocumentType(s.to_string()))
    }
}

/// Detect the document type named in OCR text
///
/// Returns one of `citizenship`, `passport`, `driving_license`,
/// `birth_certificate`, `nid` or `unknown`. Checks run in that order, so a
/// text mentioning both citizenship and passport is a citizenship document.
pub fn detect_document_type(text: &str) -> &'static str {
    let lower = text.to_lowercase();

    if lower.contains("citizenship") || lower.contains("nagrita") {
        "citizenship"
    } else if lower.contains("passport") {
        "passport"
    } else if lower.contains("driving licence") || lower.contains("driving license") {
        "driving_license"
    } else if lower.contains("birth certificate") {
        "birth_certificate"
    } else if lower.contains("national id") || lower.contains("nid") {
        "nid"
    } else {
        "unknown"
    }
}
