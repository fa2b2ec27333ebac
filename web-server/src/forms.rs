//! Form reconciliation endpoints
//!
//! Sessions are created from an OCR Response and live in process memory until
//! they are submitted, cancelled or left idle past the configured timeout.
//! Every request that reaches a session resets its idle clock.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use setu::forms::{
    form_title, FormConfig, FormSession, ReconcileOptions, Reconciler, Reconciliation,
    SubmitOutcome, UnavailableReason,
};
use setu::SessionError;
use setu_types::{FieldDescriptor, FieldErrors, OcrResponse, SubmissionPayload};

use crate::{api_error, ApiError, ApiResponse, AppState, StoredSession};

// =============================================================================
// REQUEST/RESPONSE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    pub ocr_response: OcrResponse,
    /// Overrides the configured dynamic fields mode
    pub use_dynamic_fields: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SetFieldRequest {
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub title: String,
    #[serde(flatten)]
    pub session: FormSession,
}

impl SessionView {
    fn new(id: Uuid, session: FormSession) -> Self {
        Self {
            id,
            title: form_title(session.document_type()),
            session,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CreateSessionResponse {
    Ready {
        session: SessionView,
    },
    Unavailable {
        reason: UnavailableReason,
        message: String,
    },
}

#[derive(Debug, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: FieldErrors,
}

#[derive(Debug, Serialize)]
pub struct SubmitResult {
    pub submitted: bool,
    pub payload: Option<SubmissionPayload>,
    pub errors: FieldErrors,
}

type FormResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn reconciler_for(state: &AppState, use_dynamic_fields: Option<bool>) -> Reconciler {
    match use_dynamic_fields {
        Some(flag) => state.reconciler.with_options(ReconcileOptions {
            use_dynamic_fields: flag,
            ..state.reconciler.options()
        }),
        None => state.reconciler.clone(),
    }
}

fn session_not_found(id: Uuid) -> ApiError {
    api_error(StatusCode::NOT_FOUND, format!("Session {} not found", id))
}

fn session_error(e: SessionError) -> ApiError {
    let status = match e {
        SessionError::UnknownField { .. } => StatusCode::BAD_REQUEST,
        SessionError::AlreadySubmitted => StatusCode::CONFLICT,
    };
    api_error(status, e.to_string())
}

// =============================================================================
// ROUTE HANDLERS
// =============================================================================

/// GET /api/forms/config - Static field table
pub async fn get_form_config(State(state): State<AppState>) -> Json<ApiResponse<FormConfig>> {
    Json(ApiResponse::ok(state.reconciler.config().clone()))
}

/// POST /api/forms/resolve - Field descriptors without starting a session
pub async fn resolve_fields(
    State(state): State<AppState>,
    Json(req): Json<ReconcileRequest>,
) -> Json<ApiResponse<Vec<FieldDescriptor>>> {
    let reconciler = reconciler_for(&state, req.use_dynamic_fields);
    Json(ApiResponse::ok(reconciler.resolve(&req.ocr_response)))
}

/// POST /api/forms/sessions - Start a session
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<ReconcileRequest>,
) -> FormResult<CreateSessionResponse> {
    let reconciler = reconciler_for(&state, req.use_dynamic_fields);

    let response = match reconciler.reconcile(&req.ocr_response) {
        Reconciliation::Ready(session) => {
            let id = Uuid::new_v4();
            state
                .sessions
                .write()
                .await
                .insert(id, StoredSession::new(session.clone()));
            info!("Created {} form session {}", session.document_type(), id);
            CreateSessionResponse::Ready {
                session: SessionView::new(id, session),
            }
        }
        Reconciliation::Unavailable(reason) => CreateSessionResponse::Unavailable {
            reason,
            message: reason.message().to_string(),
        },
    };

    Ok(Json(ApiResponse::ok(response)))
}

/// GET /api/forms/sessions/:id - Session view
pub async fn get_session(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> FormResult<SessionView> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| session_not_found(id))?
        .touch();
    Ok(Json(ApiResponse::ok(SessionView::new(id, session.clone()))))
}

/// PUT /api/forms/sessions/:id/fields/:name - Edit one field
pub async fn set_field(
    Path((id, name)): Path<(Uuid, String)>,
    State(state): State<AppState>,
    Json(req): Json<SetFieldRequest>,
) -> FormResult<SessionView> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| session_not_found(id))?
        .touch();

    session.set_field(&name, req.value).map_err(session_error)?;
    Ok(Json(ApiResponse::ok(SessionView::new(id, session.clone()))))
}

/// POST /api/forms/sessions/:id/validate - Validate all fields
pub async fn validate_session(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> FormResult<ValidationResult> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| session_not_found(id))?
        .touch();

    let valid = session.validate();
    Ok(Json(ApiResponse::ok(ValidationResult {
        valid,
        errors: session.errors().clone(),
    })))
}

/// POST /api/forms/sessions/:id/submit - Validate and deliver; discards the
/// session once delivered
pub async fn submit_session(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> FormResult<SubmitResult> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| session_not_found(id))?
        .touch();

    let result = match session.submit(&state.submissions).map_err(session_error)? {
        SubmitOutcome::Submitted(payload) => {
            sessions.remove(&id);
            SubmitResult {
                submitted: true,
                payload: Some(payload),
                errors: FieldErrors::new(),
            }
        }
        SubmitOutcome::Invalid(errors) => {
            warn!("Session {} has {} invalid fields", id, errors.len());
            SubmitResult {
                submitted: false,
                payload: None,
                errors,
            }
        }
    };

    Ok(Json(ApiResponse::ok(result)))
}

/// DELETE /api/forms/sessions/:id - Cancel a session
pub async fn delete_session(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    match state.sessions.write().await.remove(&id) {
        Some(_) => {
            info!("Cancelled form session {}", id);
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(session_not_found(id)),
    }
}
