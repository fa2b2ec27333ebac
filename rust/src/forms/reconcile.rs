//! Document-to-form reconciliation
//!
//! Turns an OCR response into a seeded `FormSession`, or into one of the
//! degraded states the UI renders as "No document type detected.".

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use setu_types::{FieldDescriptor, OcrResponse};
use tracing::{info, warn};

use super::config::FormConfig;
use super::inference::DateHeuristic;
use super::resolver::resolve_fields;
use super::session::FormSession;

/// Message rendered when no form can be shown
pub const NO_DOCUMENT_TYPE_MESSAGE: &str = "No document type detected.";

/// Options controlling field resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOptions {
    /// Derive fields from extracted keys instead of the static table
    pub use_dynamic_fields: bool,
    pub date_heuristic: DateHeuristic,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            use_dynamic_fields: true,
            date_heuristic: DateHeuristic::default(),
        }
    }
}

/// Why no form session could be built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    MissingDocumentType,
    EmptyFieldSet,
}

impl UnavailableReason {
    pub fn message(&self) -> &'static str {
        NO_DOCUMENT_TYPE_MESSAGE
    }
}

/// Outcome of reconciling one OCR response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Ready(FormSession),
    Unavailable(UnavailableReason),
}

impl Reconciliation {
    pub fn session(self) -> Option<FormSession> {
        match self {
            Reconciliation::Ready(session) => Some(session),
            Reconciliation::Unavailable(_) => None,
        }
    }
}

/// Builds form sessions against an immutable field configuration
#[derive(Debug, Clone)]
pub struct Reconciler {
    config: Arc<FormConfig>,
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(config: Arc<FormConfig>, options: ReconcileOptions) -> Self {
        Self { config, options }
    }

    /// Reconciler over the built-in table with default options
    pub fn with_builtin_config() -> Self {
        Self::new(Arc::new(FormConfig::builtin()), ReconcileOptions::default())
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn options(&self) -> ReconcileOptions {
        self.options
    }

    /// Copy of this reconciler with different options, sharing the config
    pub fn with_options(&self, options: ReconcileOptions) -> Self {
        Self {
            config: Arc::clone(&self.config),
            options,
        }
    }

    /// Field list for a response, without building a session
    pub fn resolve(&self, response: &OcrResponse) -> Vec<FieldDescriptor> {
        resolve_fields(
            response.document_type(),
            response.extracted_data.as_ref(),
            self.options.use_dynamic_fields,
            &self.config,
            self.options.date_heuristic,
        )
    }

    pub fn reconcile(&self, response: &OcrResponse) -> Reconciliation {
        let Some(document_type) = response.document_type() else {
            warn!("OCR response has no document type");
            return Reconciliation::Unavailable(UnavailableReason::MissingDocumentType);
        };

        let fields = self.resolve(response);
        if fields.is_empty() {
            warn!("No fields resolved for document type {}", document_type);
            return Reconciliation::Unavailable(UnavailableReason::EmptyFieldSet);
        }

        info!(
            "Reconciled {} document into {} fields",
            document_type,
            fields.len()
        );
        Reconciliation::Ready(FormSession::new(
            document_type,
            fields,
            response.extracted_data.as_ref(),
        ))
    }
}

/// Heading for a document form, e.g. `"DRIVING LICENSE Mock Form"`
pub fn form_title(document_type: &str) -> String {
    format!("{} Mock Form", document_type.replace('_', " ").to_uppercase())
}
