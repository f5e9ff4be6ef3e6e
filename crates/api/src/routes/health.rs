//! Liveness endpoint, mounted at the root rather than under `/api/v1`.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when the database answers, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    /// Completion model turns are sent to.
    pub model: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub database: bool,
    /// Whether MEDIA_DIR exists. Uploads create it on demand.
    pub media_storage: bool,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = adsage_db::health_check(&state.pool).await.is_ok();
    let media_storage = tokio::fs::metadata(&state.config.media_dir)
        .await
        .is_ok_and(|meta| meta.is_dir());

    if !database {
        tracing::warn!("Health check: database unreachable");
    }

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        model: state.config.completion.model.clone(),
        checks: HealthChecks {
            database,
            media_storage,
        },
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
