//! Route definitions for analysis sessions, mounted at `/sessions`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{results, selections, sessions};
use crate::state::AppState;

/// ```text
/// GET    /                                      -> list_sessions
/// POST   /                                      -> create_session
/// GET    /{key}                                 -> get_session
/// PUT    /{key}/creative                        -> update_creative
/// POST   /{key}/messages                        -> send_message
/// GET    /{key}/selections                      -> list_selections
/// POST   /{key}/selections/{recommendation_id}  -> toggle_selection
/// POST   /{key}/results                         -> record_results
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sessions::list_sessions).post(sessions::create_session))
        .route("/{key}", get(sessions::get_session))
        .route("/{key}/creative", put(sessions::update_creative))
        .route("/{key}/messages", post(sessions::send_message))
        .route("/{key}/selections", get(selections::list_selections))
        .route(
            "/{key}/selections/{recommendation_id}",
            post(selections::toggle_selection),
        )
        .route("/{key}/results", post(results::record_results))
}
