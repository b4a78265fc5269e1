//! Candidate listing, batch submission and lookup

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use intake_common::pagination::Page;
use intake_common::schema::json_type_name;
use intake_common::CandidateRecord;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::service::{CandidateDetails, SubmitOutcome};
use crate::AppState;

/// Query parameters for listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Page number (1-indexed), kept raw so a bad value falls back to page 1
    pub page: Option<String>,
}

impl ListQuery {
    /// Requested page; missing, non-numeric and values below 1 mean page 1
    pub fn page(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(|page| usize::try_from(page.max(1)).unwrap_or(usize::MAX))
            .unwrap_or(1)
    }
}

/// Build candidate API routes
pub fn candidate_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/candidates/list",
            get(list_candidates).post(submit_candidates),
        )
        .route("/api/candidate/:id/get-details", get(get_candidate_details))
}

/// GET /api/candidates/list?page=N
///
/// Returns `{data, total, page, totalPages}` with 10 records per page.
pub async fn list_candidates(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Page<CandidateRecord>>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let page = state.service.list(query.page()).await?;
    Ok(Json(page))
}

/// POST /api/candidates/list
///
/// Body is a JSON array of candidate records. The whole batch is merged or
/// the whole batch is refused with the list of offending entries.
pub async fn submit_candidates(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let entries = match body {
        Value::Array(entries) => entries,
        other => {
            return Err(ApiError::BadRequest(format!(
                "Expected a JSON array of candidates, received {}",
                json_type_name(&other)
            )))
        }
    };

    let response = match state.service.submit_batch(entries).await? {
        SubmitOutcome::Accepted(summary) => (
            StatusCode::OK,
            Json(json!({
                "message": "Candidates saved",
                "added": summary.added,
                "merged": summary.merged,
                "outcomes": summary.outcomes,
            })),
        )
            .into_response(),
        SubmitOutcome::Rejected(rejections) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "code": "VALIDATION_REJECTED",
                    "message": format!(
                        "{} candidate(s) failed validation; nothing was saved",
                        rejections.len()
                    ),
                },
                "rejections": rejections,
            })),
        )
            .into_response(),
    };

    Ok(response)
}

/// GET /api/candidate/:id/get-details
///
/// Returns the record and, if it is incomplete, the list of missing or
/// malformed fields.
pub async fn get_candidate_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CandidateDetails>> {
    let details = state.service.get_by_session_id(&id).await?;
    Ok(Json(details))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of(raw: Option<&str>) -> usize {
        ListQuery {
            page: raw.map(str::to_string),
        }
        .page()
    }

    #[test]
    fn test_page_parameter_parsing() {
        assert_eq!(page_of(None), 1);
        assert_eq!(page_of(Some("3")), 3);
        assert_eq!(page_of(Some("0")), 1);
        assert_eq!(page_of(Some("-1")), 1);
        assert_eq!(page_of(Some("abc")), 1);
        assert_eq!(page_of(Some("")), 1);
    }
}
