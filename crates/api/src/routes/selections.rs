//! Route definitions for selections, mounted at `/selections`.

use axum::routing::put;
use axum::Router;

use crate::handlers::selections;
use crate::state::AppState;

/// ```text
/// PUT    /{recommendation_id}/status   -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{recommendation_id}/status", put(selections::update_status))
}
