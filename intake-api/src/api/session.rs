//! Intake session endpoint
//!
//! Issues a new sessionId for a candidate about to start intake. The
//! session is not stored; the record is created by the first batch that
//! carries the id.

use axum::{extract::rejection::JsonRejection, Json};
use intake_common::session::{self, Session};
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub name: String,
}

/// POST /api/session
pub async fn start_session(
    payload: Result<Json<StartSessionRequest>, JsonRejection>,
) -> ApiResult<Json<Session>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }

    let session = session::start_session(name);
    info!("Issued session {}", session.session_id);
    Ok(Json(session))
}
