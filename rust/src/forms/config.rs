//! Static Field Configuration
//!
//! Immutable table of field lists keyed by document type, loaded once at
//! startup from the built-in YAML or an operator-supplied file.

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use setu_types::FieldSpec;
use tracing::{debug, info};

use crate::error::ConfigError;

const BUILTIN_FORMS_YAML: &str = include_str!("../../config/forms.yaml");

/// Field lists per document type, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(default)]
    document_types: IndexMap<String, Vec<FieldSpec>>,
}

impl FormConfig {
    /// The built-in table (citizenship, passport, pan, driving_license)
    pub fn builtin() -> Self {
        Self::from_yaml_str(BUILTIN_FORMS_YAML).expect("valid built-in forms.yaml")
    }

    /// Parse and validate a YAML table
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: FormConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML table from disk
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_yaml_str(&content)?;
        info!(
            "Loaded form configuration for {} document types from {:?}",
            config.document_types.len(),
            path
        );
        Ok(config)
    }

    /// Field specs for a document type, if configured
    pub fn fields_for(&self, document_type: &str) -> Option<&[FieldSpec]> {
        self.document_types.get(document_type).map(Vec::as_slice)
    }

    /// Configured document types in declaration order
    pub fn document_types(&self) -> impl Iterator<Item = &str> {
        self.document_types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.document_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document_types.is_empty()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (document_type, specs) in &self.document_types {
            let mut seen = HashSet::new();
            for spec in specs {
                if spec.name.trim().is_empty() {
                    return Err(ConfigError::EmptyFieldName {
                        document_type: document_type.clone(),
                    });
                }
                if !seen.insert(spec.name.as_str()) {
                    return Err(ConfigError::DuplicateField {
                        document_type: document_type.clone(),
                        field: spec.name.clone(),
                    });
                }
            }
            debug!("Form config: {} has {} fields", document_type, specs.len());
        }
        Ok(())
    }
}
