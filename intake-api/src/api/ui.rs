//! UI serving routes
//!
//! Static HTML pages; all data is fetched from the JSON API by app.js.

use axum::{
    http::header,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::AppState;

const INDEX_HTML: &str = include_str!("../../ui/index.html");
const LOAD_HTML: &str = include_str!("../../ui/load.html");
const CANDIDATE_HTML: &str = include_str!("../../ui/candidate.html");
const APP_JS: &str = include_str!("../../ui/app.js");
const APP_CSS: &str = include_str!("../../ui/app.css");

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(serve_index))
        .route("/load", get(serve_load))
        .route("/candidate", get(serve_candidate))
        .route("/static/app.js", get(serve_app_js))
        .route("/static/app.css", get(serve_app_css))
}

/// GET / - candidate card list
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /load - pick a JSON file and submit it as a batch
pub async fn serve_load() -> Html<&'static str> {
    Html(LOAD_HTML)
}

/// GET /candidate - fetch, review and edit one record
pub async fn serve_candidate() -> Html<&'static str> {
    Html(CANDIDATE_HTML)
}

pub async fn serve_app_js() -> Response {
    ([(header::CONTENT_TYPE, "application/javascript")], APP_JS).into_response()
}

pub async fn serve_app_css() -> Response {
    ([(header::CONTENT_TYPE, "text/css")], APP_CSS).into_response()
}
