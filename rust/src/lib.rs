//! Setu - document-to-form reconciliation
//!
//! Takes the structured result of scanning an identity document and turns it
//! into an editable, validated form whose submission is handed to the rest of
//! the application.
//!
//! ## Flow
//! Upload -> `scanner` (text extraction, type detection, parsing) -> OCR
//! Response -> `forms::Reconciler` (field resolution) -> `FormSession`
//! (edit, validate) -> `SubmissionAdapter`.
//!
//! ## Quick Start
//!
//! ```rust
//! use setu::forms::{Reconciler, SubmissionAdapter, SubmitOutcome};
//! use setu_types::{ExtractedData, OcrResponse};
//!
//! let response = OcrResponse::new(
//!     "success",
//!     "citizenship",
//!     ExtractedData::new()
//!         .with("full_name", "Ram Sharma")
//!         .with("dob", "1990-01-01"),
//! );
//!
//! let mut session = Reconciler::with_builtin_config()
//!     .reconcile(&response)
//!     .session()
//!     .expect("citizenship form");
//! session.set_field("full_name", "Ram B. Sharma").unwrap();
//!
//! let outcome = session.submit(&SubmissionAdapter::detached()).unwrap();
//! assert!(matches!(outcome, SubmitOutcome::Submitted(_)));
//! ```

// Core error handling
pub mod error;

// Environment configuration
pub mod config;

// Field resolution, form sessions and submission
pub mod forms;

// Document scanning into OCR responses
pub mod scanner;

pub use config::SetuConfig;
pub use error::{ConfigError, ScanError, SessionError, SetuError, SetuResult};
pub use forms::{FormConfig, FormSession, Reconciler, Reconciliation, SubmissionAdapter};
pub use scanner::{DocumentScanService, DocumentUpload};
