//! Setu Types - Foundation Types
//!
//! Pure data structures for the document-to-form reconciliation flow. Every
//! other Setu crate depends on this one; this crate depends on no workspace
//! crate.
//!
//! ## Contents
//!
//! - OCR responses and the ordered extracted-data mapping
//! - Field descriptors and static field specs
//! - Form/session state shapes and the submission payload
//! - Guided form templates
//! - Scan archive records
//!
//! Key order matters throughout: extracted data, form state and submission
//! payloads are all insertion-ordered maps.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Editable value per field name, in descriptor order
pub type FieldValues = IndexMap<String, String>;

/// Validation message per invalid field name
pub type FieldErrors = IndexMap<String, String>;

// ============================================================================
// OCR RESPONSE
// ============================================================================

/// Structured result of the external document-scanning step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrResponse {
    /// Scanner status string (e.g. "success")
    #[serde(default)]
    pub status: String,

    /// Detected or requested document type (e.g. "citizenship")
    #[serde(default)]
    pub document_type: Option<String>,

    /// Extracted key/value pairs; `None` when absent, null or not an object
    #[serde(default, deserialize_with = "lenient_extracted_data")]
    pub extracted_data: Option<ExtractedData>,
}

impl OcrResponse {
    /// Create a response with the given document type and data
    pub fn new(
        status: impl Into<String>,
        document_type: impl Into<String>,
        extracted_data: ExtractedData,
    ) -> Self {
        Self {
            status: status.into(),
            document_type: Some(document_type.into()),
            extracted_data: Some(extracted_data),
        }
    }

    /// Document type, treating an empty string as absent
    pub fn document_type(&self) -> Option<&str> {
        self.document_type.as_deref().filter(|t| !t.is_empty())
    }
}

fn lenient_extracted_data<'de, D>(deserializer: D) -> Result<Option<ExtractedData>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Map(ExtractedData),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::Map(data)) => Some(data),
        Some(Lenient::Other(_)) | None => None,
    })
}

/// Ordered string-to-string mapping of OCR-extracted fields
///
/// Deserialization keeps the JSON object's key order and coerces values to
/// strings: `null` becomes `""`, scalars become their JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtractedData(IndexMap<String, String>);

impl ExtractedData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in extraction order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ExtractedData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for ExtractedData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        serde_json::Value::Null => String::new(),
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (key, value)
                })
                .collect(),
        ))
    }
}

// ============================================================================
// FIELD DESCRIPTORS
// ============================================================================

/// Input kind of a form field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Date,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Date => "date",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved shape of one form field for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Unique key, also the key in form state and the submission payload
    pub name: String,
    /// Human-readable label
    pub label: String,
    /// Input kind
    #[serde(rename = "type")]
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
        }
    }
}

/// One entry of the static per-document-type field table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    #[serde(default, rename = "type")]
    pub kind: FieldKind,
}

impl From<&FieldSpec> for FieldDescriptor {
    fn from(spec: &FieldSpec) -> Self {
        FieldDescriptor::new(spec.name.clone(), spec.label.clone(), spec.kind)
    }
}

// ============================================================================
// FORM SESSION
// ============================================================================

/// Lifecycle phase of a form-fill session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Editing,
    Validating,
    Submitted,
}

/// Final reconciled data handed to the submission callback
///
/// Serializes as one flat object: `document_type` first, then every field in
/// descriptor order. A field named `document_type` overrides the value but
/// keeps the first position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub document_type: String,
    pub fields: FieldValues,
}

impl SubmissionPayload {
    pub fn new(document_type: impl Into<String>, fields: FieldValues) -> Self {
        Self {
            document_type: document_type.into(),
            fields,
        }
    }

    /// Flattened view in serialization order
    pub fn to_map(&self) -> IndexMap<String, String> {
        let mut map = IndexMap::with_capacity(self.fields.len() + 1);
        map.insert("document_type".to_string(), self.document_type.clone());
        for (name, value) in &self.fields {
            map.insert(name.clone(), value.clone());
        }
        map
    }
}

impl Serialize for SubmissionPayload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let flat = self.to_map();
        let mut map = serializer.serialize_map(Some(flat.len()))?;
        for (key, value) in &flat {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// ============================================================================
// GUIDED FORMS
// ============================================================================

/// Question input type of a guided form template
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    #[default]
    Text,
    Number,
    Choice,
    File,
}

/// One question of a guided form template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub question_type: QuestionType,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub choices: Option<Vec<String>>,
}

fn default_required() -> bool {
    true
}

/// A guided form template offered by a government service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidedForm {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

// ============================================================================
// SCAN ARCHIVE
// ============================================================================

/// Archived result of one document scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub file_name: String,
    /// Hex SHA-256 of the uploaded bytes
    pub sha256: String,
    pub document_type: String,
    pub response: OcrResponse,
    pub scanned_at: DateTime<Utc>,
}
