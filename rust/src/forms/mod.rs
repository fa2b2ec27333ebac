//! Document-to-form reconciliation
//!
//! Leaf first: labeler and inferrer feed the resolver, the resolver feeds
//! `FormSession`, and sessions deliver through the `SubmissionAdapter`.

pub mod config;
pub mod guided;
pub mod inference;
pub mod labeler;
pub mod reconcile;
pub mod resolver;
pub mod session;
pub mod submission;

pub use config::FormConfig;
pub use guided::{document_type_for_form, prefill_answers, validate_answers, Answers};
pub use inference::{infer_field_kind, DateHeuristic};
pub use labeler::field_label;
pub use reconcile::{
    form_title, ReconcileOptions, Reconciler, Reconciliation, UnavailableReason,
    NO_DOCUMENT_TYPE_MESSAGE,
};
pub use resolver::resolve_fields;
pub use session::{FormSession, SubmitOutcome, REQUIRED_MESSAGE};
pub use submission::{CallbackSink, SubmissionAdapter, SubmissionSink};
