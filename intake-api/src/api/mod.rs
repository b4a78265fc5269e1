//! HTTP API handlers for intake-api

pub mod buildinfo;
pub mod candidates;
pub mod health;
pub mod session;
pub mod ui;

pub use buildinfo::get_build_info;
pub use candidates::{candidate_routes, get_candidate_details, list_candidates, submit_candidates};
pub use health::health_routes;
pub use session::start_session;
pub use ui::ui_routes;
