//! Submission Adapter
//!
//! Hands a reconciled payload to whatever the embedding application supplied.
//! The core itself never persists or transmits a submission.

use std::fmt;
use std::sync::Arc;

use setu_types::SubmissionPayload;
use tracing::debug;

/// Receiver of final form submissions
pub trait SubmissionSink: Send + Sync {
    fn deliver(&self, payload: &SubmissionPayload);
}

/// Sink backed by a closure
pub struct CallbackSink<F>(F);

impl<F> CallbackSink<F>
where
    F: Fn(&SubmissionPayload) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self(callback)
    }
}

impl<F> SubmissionSink for CallbackSink<F>
where
    F: Fn(&SubmissionPayload) + Send + Sync,
{
    fn deliver(&self, payload: &SubmissionPayload) {
        (self.0)(payload)
    }
}

/// Optional sink wrapper used by `FormSession::submit`
#[derive(Clone, Default)]
pub struct SubmissionAdapter {
    sink: Option<Arc<dyn SubmissionSink>>,
}

impl SubmissionAdapter {
    pub fn new(sink: Arc<dyn SubmissionSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Adapter with no sink: payloads are only logged
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn from_fn<F>(callback: F) -> Self
    where
        F: Fn(&SubmissionPayload) + Send + Sync + 'static,
    {
        Self::new(Arc::new(CallbackSink::new(callback)))
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    pub fn deliver(&self, payload: &SubmissionPayload) {
        match &self.sink {
            Some(sink) => sink.deliver(payload),
            None => debug!(
                "No submission sink attached; final data for {}: {:?}",
                payload.document_type,
                payload.to_map()
            ),
        }
    }
}

impl fmt::Debug for SubmissionAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionAdapter")
            .field("has_sink", &self.has_sink())
            .finish()
    }
}
