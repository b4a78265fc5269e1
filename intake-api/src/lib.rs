//! intake-api library - Candidate Intake service
//!
//! HTTP surface over the candidate record store: paginated listing, atomic
//! batch merge, lookup with completeness hints, session issue, and the
//! static review/edit pages.

use std::sync::Arc;

use axum::Router;
use intake_common::CandidateStore;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod service;

pub use crate::error::{ApiError, ApiResult};
use crate::service::CandidateService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: CandidateService,
}

impl AppState {
    /// Create new application state over a record store
    pub fn new(store: Arc<dyn CandidateStore>) -> Self {
        Self {
            service: CandidateService::new(store),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .merge(api::ui_routes())
        .merge(api::candidate_routes())
        .route("/api/session", post(api::start_session))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
