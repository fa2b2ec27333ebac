//! Form State Controller
//!
//! `FormSession` owns one form-fill session: the resolved field descriptors,
//! the editable values seeded from extracted data, per-field validation errors
//! and the lifecycle phase.
//!
//! ```text
//! Editing --submit--> Validating --ok--> Submitted (terminal)
//!    ^                    |
//!    +------invalid-------+
//! ```

use serde::Serialize;
use setu_types::{
    ExtractedData, FieldDescriptor, FieldErrors, FieldValues, SessionPhase, SubmissionPayload,
};
use tracing::{debug, info};

use super::submission::SubmissionAdapter;
use crate::error::SessionError;

/// Message recorded for every empty field on validation
pub const REQUIRED_MESSAGE: &str = "Required";

/// Result of a submit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was delivered
    Invalid(FieldErrors),
    /// Payload was handed to the submission adapter
    Submitted(SubmissionPayload),
}

/// One active form-fill session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSession {
    document_type: String,
    #[serde(rename = "fields")]
    descriptors: Vec<FieldDescriptor>,
    values: FieldValues,
    errors: FieldErrors,
    phase: SessionPhase,
}

impl FormSession {
    /// Create a session and seed it from extracted data
    pub fn new(
        document_type: impl Into<String>,
        descriptors: Vec<FieldDescriptor>,
        extracted: Option<&ExtractedData>,
    ) -> Self {
        let mut session = Self {
            document_type: document_type.into(),
            descriptors: Vec::new(),
            values: FieldValues::new(),
            errors: FieldErrors::new(),
            phase: SessionPhase::Editing,
        };
        session.seed(descriptors, extracted);
        session
    }

    /// Reset the session to the given fields, seeding each value from
    /// `extracted[name]` or the empty string
    pub fn seed(&mut self, descriptors: Vec<FieldDescriptor>, extracted: Option<&ExtractedData>) {
        self.values = descriptors
            .iter()
            .map(|field| {
                let value = extracted
                    .and_then(|data| data.get(&field.name))
                    .unwrap_or_default();
                (field.name.clone(), value.to_string())
            })
            .collect();
        self.descriptors = descriptors;
        self.errors.clear();
        self.phase = SessionPhase::Editing;

        debug!(
            "Seeded {} session with {} fields",
            self.document_type,
            self.descriptors.len()
        );
    }

    /// Update one field and clear its validation error
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> Result<(), SessionError> {
        if self.phase == SessionPhase::Submitted {
            return Err(SessionError::AlreadySubmitted);
        }

        let slot = self
            .values
            .get_mut(name)
            .ok_or_else(|| SessionError::UnknownField {
                name: name.to_string(),
            })?;
        *slot = value.into();
        self.errors.shift_remove(name);
        Ok(())
    }

    /// Recompute validation errors; every field is required
    pub fn validate(&mut self) -> bool {
        let submitted = self.phase == SessionPhase::Submitted;
        if !submitted {
            self.phase = SessionPhase::Validating;
        }

        self.errors = self
            .descriptors
            .iter()
            .filter(|field| self.values.get(&field.name).map_or(true, String::is_empty))
            .map(|field| (field.name.clone(), REQUIRED_MESSAGE.to_string()))
            .collect();

        if !submitted {
            self.phase = SessionPhase::Editing;
        }
        self.errors.is_empty()
    }

    /// Validate and, on success, deliver `{document_type, ...values}`
    pub fn submit(&mut self, adapter: &SubmissionAdapter) -> Result<SubmitOutcome, SessionError> {
        if self.phase == SessionPhase::Submitted {
            return Err(SessionError::AlreadySubmitted);
        }

        if !self.validate() {
            debug!(
                "Submission of {} blocked by {} invalid fields",
                self.document_type,
                self.errors.len()
            );
            return Ok(SubmitOutcome::Invalid(self.errors.clone()));
        }

        let payload = self.payload();
        adapter.deliver(&payload);
        self.phase = SessionPhase::Submitted;

        info!(
            "Submitted {} form with {} fields",
            self.document_type,
            self.descriptors.len()
        );
        Ok(SubmitOutcome::Submitted(payload))
    }

    /// Current values as a submission payload (no validation)
    pub fn payload(&self) -> SubmissionPayload {
        SubmissionPayload::new(self.document_type.clone(), self.values.clone())
    }

    pub fn document_type(&self) -> &str {
        &self.document_type
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_submitted(&self) -> bool {
        self.phase == SessionPhase::Submitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use setu_types::FieldKind;

    fn descriptors(names: &[&str]) -> Vec<FieldDescriptor> {
        names
            .iter()
            .map(|n| FieldDescriptor::new(*n, *n, FieldKind::Text))
            .collect()
    }

    fn pan_session() -> FormSession {
        let data = ExtractedData::new()
            .with("pan_number", "123456789")
            .with("full_name", "");
        FormSession::new(
            "pan",
            descriptors(&["pan_number", "full_name", "address"]),
            Some(&data),
        )
    }

    #[test]
    fn test_seed_uses_extracted_or_empty() {
        let session = pan_session();
        assert_eq!(session.value("pan_number"), Some("123456789"));
        assert_eq!(session.value("full_name"), Some(""));
        assert_eq!(session.value("address"), Some(""));
        assert_eq!(session.phase(), SessionPhase::Editing);
    }

    #[test]
    fn test_seed_without_data() {
        let session = FormSession::new("pan", descriptors(&["pan_number"]), None);
        assert_eq!(session.value("pan_number"), Some(""));
    }

    #[test]
    fn test_validate_marks_empty_fields_required() {
        let mut session = pan_session();
        assert!(!session.validate());
        assert_eq!(session.error("full_name"), Some(REQUIRED_MESSAGE));
        assert_eq!(session.error("address"), Some(REQUIRED_MESSAGE));
        assert_eq!(session.error("pan_number"), None);
        assert_eq!(session.phase(), SessionPhase::Editing);
    }

    #[test]
    fn test_whitespace_counts_as_answered() {
        let mut session = FormSession::new("pan", descriptors(&["address"]), None);
        session.set_field("address", " ").unwrap();
        assert!(session.validate());
    }

    #[test]
    fn test_set_field_clears_only_that_error() {
        let mut session = pan_session();
        session.validate();
        session.set_field("full_name", "Sita Rai").unwrap();
        assert_eq!(session.error("full_name"), None);
        assert_eq!(session.error("address"), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn test_set_unknown_field_is_rejected() {
        let mut session = pan_session();
        let err = session.set_field("nickname", "x").unwrap_err();
        assert_eq!(
            err,
            SessionError::UnknownField {
                name: "nickname".into()
            }
        );
        assert!(session.value("nickname").is_none());
    }

    #[test]
    fn test_invalid_submit_delivers_nothing() {
        let mut session = pan_session();
        let delivered = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = std::sync::Arc::clone(&delivered);
        let adapter = SubmissionAdapter::from_fn(move |_| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });

        let outcome = session.submit(&adapter).unwrap();
        assert!(matches!(outcome, SubmitOutcome::Invalid(ref errs) if errs.len() == 2));
        assert_eq!(delivered.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(!session.is_submitted());
    }

    #[test]
    fn test_submit_transitions_to_terminal() {
        let mut session = pan_session();
        session.set_field("full_name", "Sita Rai").unwrap();
        session.set_field("address", "Pokhara").unwrap();

        let outcome = session.submit(&SubmissionAdapter::detached()).unwrap();
        let SubmitOutcome::Submitted(payload) = outcome else {
            panic!("expected submission");
        };
        assert_eq!(payload.document_type, "pan");
        assert_eq!(payload.fields.get("address").map(String::as_str), Some("Pokhara"));
        assert!(session.is_submitted());

        assert_eq!(
            session.submit(&SubmissionAdapter::detached()),
            Err(SessionError::AlreadySubmitted)
        );
        assert_eq!(
            session.set_field("address", "Lalitpur"),
            Err(SessionError::AlreadySubmitted)
        );
    }

    #[test]
    fn test_reseed_resets_errors_and_phase() {
        let mut session = pan_session();
        session.validate();
        session.seed(descriptors(&["pan_number"]), None);
        assert!(session.errors().is_empty());
        assert_eq!(session.fields().len(), 1);
        assert_eq!(session.values().len(), 1);
    }

    proptest! {
        #[test]
        fn prop_seed_is_idempotent(
            entries in proptest::collection::vec(("[a-z_]{1,10}", "[ -~]{0,10}"), 0..12),
        ) {
            let data: ExtractedData = entries.into_iter().collect();
            let fields: Vec<_> = data
                .keys()
                .map(|k| FieldDescriptor::new(k, k, FieldKind::Text))
                .collect();

            let mut session = FormSession::new("citizenship", fields.clone(), Some(&data));
            let first = session.values().clone();
            session.seed(fields, Some(&data));
            prop_assert_eq!(&first, session.values());
        }

        #[test]
        fn prop_payload_keys_match_descriptors(
            names in proptest::collection::hash_set("[a-z]{1,8}", 1..10),
        ) {
            let fields: Vec<_> = names
                .iter()
                .map(|n| FieldDescriptor::new(n.as_str(), n.as_str(), FieldKind::Text))
                .collect();
            let mut session = FormSession::new("passport", fields.clone(), None);
            for field in &fields {
                session.set_field(&field.name, "x").unwrap();
            }

            let SubmitOutcome::Submitted(payload) =
                session.submit(&SubmissionAdapter::detached()).unwrap()
            else {
                panic!("all fields filled");
            };
            let map = payload.to_map();
            let mut expected: Vec<&str> = vec!["document_type"];
            expected.extend(fields.iter().map(|f| f.name.as_str()).filter(|n| *n != "document_type"));
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            prop_assert_eq!(keys, expected);
        }
    }
}
