//! Error handling for the Setu reconciliation core
//!
//! Idiomatic error types using thiserror. Degraded UI states (no document
//! type, empty field set) and validation failures are NOT errors; they are
//! modelled as values in `forms::reconcile` and `forms::session`.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the Setu core
#[derive(Error, Debug)]
pub enum SetuError {
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
}

/// Misuse of a form session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unknown field '{name}'")]
    UnknownField { name: String },

    #[error("Session already submitted")]
    AlreadySubmitted,
}

/// Static field table and environment configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid form configuration YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Duplicate field '{field}' for document type '{document_type}'")]
    DuplicateField {
        document_type: String,
        field: String,
    },

    #[error("Empty field name for document type '{document_type}'")]
    EmptyFieldName { document_type: String },

    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

/// Document scan errors
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("File and document_type are required.")]
    MissingInput,

    #[error("Invalid document_type.")]
    InvalidDocumentType(String),

    #[error("Failed to extract text from {file_name}: {reason}")]
    Extraction { file_name: String, reason: String },

    #[error("Failed to archive scan result to {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for core operations
pub type SetuResult<T> = Result<T, SetuError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_messages() {
        assert_eq!(
            ScanError::MissingInput.to_string(),
            "File and document_type are required."
        );
        assert_eq!(
            ScanError::InvalidDocumentType("nid".into()).to_string(),
            "Invalid document_type."
        );
    }

    #[test]
    fn test_umbrella_conversion() {
        let err: SetuError = SessionError::UnknownField {
            name: "nickname".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Session error: Unknown field 'nickname'");
    }

    #[test]
    fn test_io_error_names_path() {
        let err = ConfigError::Io {
            path: PathBuf::from("/etc/setu/forms.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "Failed to read /etc/setu/forms.yaml: missing");
    }
}
