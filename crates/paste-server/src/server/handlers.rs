//! Axum request handlers for all service endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use common::protocol::{CreatePasteResponse, ErrorResponse, HealthResponse};
use common::{Paste, PasteId, ServiceError};
use paste_crypto::{envelope, EnvelopeMode};
use paste_store::StoreError;
use tracing::{info, warn};

use super::state::AppState;

/// `POST /api/pastes`: store a new paste.
///
/// The body is a [`Paste`] whose envelope was produced client-side. The
/// envelope is checked structurally against the declared mode but is never
/// opened; the server holds no keys.
pub async fn create_paste(
    State(state): State<AppState>,
    payload: Result<Json<Paste>, JsonRejection>,
) -> Response {
    let paste = match payload {
        Ok(Json(p)) => p,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return error_response(ServiceError::PayloadTooLarge(
                "request body too large".into(),
            ));
        }
        Err(rejection) => {
            return error_response(ServiceError::BadRequest(rejection.body_text()));
        }
    };

    if let Err(err) = check_new_paste(&state, &paste) {
        return error_response(err);
    }

    let id = paste.id.clone();
    let expires_at = paste.expires_at;
    let envelope_len = paste.envelope.len();
    let has_password = paste.has_password;

    match state.store.put(paste).await {
        Ok(()) => {
            info!(paste_id = %id, envelope_len, has_password, "paste created");
            let body = CreatePasteResponse { id, expires_at };
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(StoreError::Conflict(id)) => {
            error_response(ServiceError::Conflict(format!("paste {id} already exists")))
        }
        Err(e) => {
            warn!(paste_id = %id, error = %e, "failed to store paste");
            error_response(ServiceError::Internal("failed to store paste".into()))
        }
    }
}

/// `GET /api/pastes/:id`: fetch a paste record.
///
/// Missing and expired pastes are both reported as `404`.
pub async fn get_paste(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let id = match PasteId::parse(&raw_id) {
        Ok(id) => id,
        Err(e) => return error_response(ServiceError::BadRequest(e.to_string())),
    };

    match state.store.get(&id).await {
        Ok(Some(paste)) => (StatusCode::OK, Json(paste)).into_response(),
        Ok(None) => error_response(ServiceError::NotFound(format!("paste {id} not found"))),
        Err(e) => {
            warn!(paste_id = %id, error = %e, "failed to read paste");
            error_response(ServiceError::Internal("failed to read paste".into()))
        }
    }
}

/// `GET /health`: liveness check reporting the active store backend.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        store: state.store.backend().into(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate a new paste against the configured limits, cheapest check first.
fn check_new_paste(state: &AppState, paste: &Paste) -> Result<(), ServiceError> {
    let limits = &state.limits;
    if paste.envelope.len() > limits.max_envelope_len {
        return Err(ServiceError::PayloadTooLarge(format!(
            "envelope exceeds {} characters",
            limits.max_envelope_len
        )));
    }

    envelope::validate(&paste.envelope, EnvelopeMode::from_has_password(paste.has_password))
        .map_err(|e| ServiceError::BadRequest(e.to_string()))?;

    let now = Utc::now();
    if paste.is_expired_at(now) {
        return Err(ServiceError::BadRequest(
            "expires_at must be in the future".into(),
        ));
    }
    if paste.expires_at.signed_duration_since(now) > limits.max_ttl {
        return Err(ServiceError::BadRequest(format!(
            "expires_at must be at most {} seconds ahead",
            limits.max_ttl.num_seconds()
        )));
    }
    Ok(())
}

fn error_response(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(&err))).into_response()
}
