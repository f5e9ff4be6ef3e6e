pub mod billing;
pub mod health;
pub mod media;
pub mod selections;
pub mod sessions;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /me                                                 current user
///
/// /media                                              upload creative media (POST)
///
/// /sessions                                           list, create
/// /sessions/{key}                                     get (key or numeric id)
/// /sessions/{key}/creative                            save creative (PUT)
/// /sessions/{key}/messages                            run a conversation turn (POST)
/// /sessions/{key}/selections                          current selections
/// /sessions/{key}/selections/{recommendation_id}      toggle selection (POST)
/// /sessions/{key}/results                             record results (POST)
///
/// /selections/{recommendation_id}/status              lifecycle update (PUT)
///
/// /ads/{id}                                           ad with recommendations and results
///
/// /billing/checkout                                   create checkout (POST)
/// /billing/subscription                               current plan
/// /billing/webhook                                    payments webhook (POST, public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::users::me))
        .route("/ads/{id}", get(handlers::ads::get_ad))
        .nest("/media", media::router())
        .nest("/sessions", sessions::router())
        .nest("/selections", selections::router())
        .nest("/billing", billing::router())
}
