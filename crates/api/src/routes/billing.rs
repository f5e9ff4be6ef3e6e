//! Route definitions for billing, mounted at `/billing`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::billing;
use crate::state::AppState;

/// ```text
/// POST   /checkout       -> create_checkout
/// GET    /subscription   -> get_subscription
/// POST   /webhook        -> webhook (public, signature-checked)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(billing::create_checkout))
        .route("/subscription", get(billing::get_subscription))
        .route("/webhook", post(billing::webhook))
}
