//! Setu REST backend
//!
//! Serves document scanning and form reconciliation over JSON.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Liveness
//! - `GET|POST /api/documents/scan/` - Scan an uploaded document
//! - `GET /api/forms/config` - Static field table
//! - `POST /api/forms/resolve` - Field descriptors for an OCR response
//! - `POST /api/forms/sessions` - Start a form session from an OCR response
//! - `GET /api/forms/sessions/:id` - Session view
//! - `PUT /api/forms/sessions/:id/fields/:name` - Edit one field
//! - `POST /api/forms/sessions/:id/validate` - Validate all fields
//! - `POST /api/forms/sessions/:id/submit` - Validate and deliver
//! - `DELETE /api/forms/sessions/:id` - Cancel a session

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info};
use uuid::Uuid;

use setu::forms::{FormSession, Reconciler, SubmissionAdapter};
use setu::scanner::DocumentScanService;
use setu::{SetuConfig, SetuResult};

pub mod documents;
pub mod forms;

/// A form session and the last time a request reached it
#[derive(Debug, Clone)]
pub struct StoredSession {
    session: FormSession,
    last_touched: Instant,
}

impl StoredSession {
    pub fn new(session: FormSession) -> Self {
        Self {
            session,
            last_touched: Instant::now(),
        }
    }

    /// Mark the session as in use and hand it out
    pub fn touch(&mut self) -> &mut FormSession {
        self.last_touched = Instant::now();
        &mut self.session
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    pub fn idle_for(&self) -> Duration {
        self.last_touched.elapsed()
    }
}

/// In-memory form sessions keyed by session id
///
/// Sessions leave the store when submitted or cancelled, or when
/// [`sweep_idle_sessions`] finds them abandoned.
pub type SessionStore = Arc<RwLock<HashMap<Uuid, StoredSession>>>;

pub fn new_session_store() -> SessionStore {
    Arc::new(RwLock::new(HashMap::new()))
}

/// Drop sessions idle for at least `max_idle`; returns how many went
pub async fn sweep_idle_sessions(store: &SessionStore, max_idle: Duration) -> usize {
    let mut sessions = store.write().await;
    let before = sessions.len();
    sessions.retain(|id, stored| {
        let keep = stored.idle_for() < max_idle;
        if !keep {
            debug!("Evicting idle form session {}", id);
        }
        keep
    });
    before - sessions.len()
}

/// Sweep the store every `max_idle / 2` (at least a second), forever
///
/// Meant to run inside `tokio::spawn`.
pub async fn run_session_sweeper(store: SessionStore, max_idle: Duration) {
    let period = (max_idle / 2).max(Duration::from_secs(1));
    let mut timer = tokio::time::interval(period);
    // Skip the first immediate tick
    timer.tick().await;

    info!(
        max_idle_secs = max_idle.as_secs(),
        "Form session sweeper started"
    );

    loop {
        timer.tick().await;
        let evicted = sweep_idle_sessions(&store, max_idle).await;
        if evicted > 0 {
            info!("Evicted {} idle form sessions", evicted);
        }
    }
}

// Application state
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Reconciler,
    pub scanner: DocumentScanService,
    pub submissions: SubmissionAdapter,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(
        reconciler: Reconciler,
        scanner: DocumentScanService,
        submissions: SubmissionAdapter,
    ) -> Self {
        Self {
            reconciler,
            scanner,
            submissions,
            sessions: new_session_store(),
        }
    }

    /// State wired from runtime configuration; submissions are logged
    pub fn from_config(config: &SetuConfig) -> SetuResult<Self> {
        Ok(Self::new(
            config.build_reconciler()?,
            config.build_scan_service(),
            logging_submissions(),
        ))
    }
}

/// Submission adapter that records final form data in the log
pub fn logging_submissions() -> SubmissionAdapter {
    SubmissionAdapter::from_fn(|payload| {
        let data = serde_json::to_string(payload).unwrap_or_default();
        info!("Final data for {} form: {}", payload.document_type, data);
    })
}

// API types
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Error half of form endpoint results
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ApiResponse::failure(message)))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        // Document scanning
        .route(
            "/api/documents/scan/",
            get(documents::scan_usage).post(documents::scan_document),
        )
        // Form reconciliation
        .route("/api/forms/config", get(forms::get_form_config))
        .route("/api/forms/resolve", post(forms::resolve_fields))
        .route("/api/forms/sessions", post(forms::create_session))
        .route(
            "/api/forms/sessions/:id",
            get(forms::get_session).delete(forms::delete_session),
        )
        .route("/api/forms/sessions/:id/fields/:name", put(forms::set_field))
        .route("/api/forms/sessions/:id/validate", post(forms::validate_session))
        .route("/api/forms/sessions/:id/submit", post(forms::submit_session))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

// Health check endpoint
async fn health_check() -> Json<ApiResponse<String>> {
    Json(ApiResponse::ok("OK".to_string()))
}
