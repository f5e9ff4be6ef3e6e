//! Handlers for recorded ad performance.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use adsage_core::error::CoreError;
use adsage_core::metrics::{derive_rates, validate_performance};
use adsage_db::models::ad_result::RecordAdResult;
use adsage_db::repositories::{AdResultRepo, RecommendationRepo, SelectionRepo};

use crate::advisor::load_owned_session;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::created;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecordResultsRequest {
    pub results: Vec<RecordAdResult>,
}

/// POST /api/v1/sessions/{key}/results
///
/// Records results for recommendations the user currently has selected in
/// the session. Missing rates are derived from the raw counts. All rows are
/// written in one transaction.
pub async fn record_results(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(input): Json<RecordResultsRequest>,
) -> AppResult<impl IntoResponse> {
    if input.results.is_empty() {
        return Err(CoreError::Validation("At least one result is required".into()).into());
    }

    let session = load_owned_session(&state.pool, auth.user_id, &key).await?;

    let mut rows = Vec::with_capacity(input.results.len());
    for result in input.results {
        validate_performance(&result.metrics)?;

        let recommendation =
            RecommendationRepo::find_in_session(&state.pool, result.recommendation_id, session.id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Recommendation",
                    id: result.recommendation_id,
                })?;

        let selected = SelectionRepo::find(&state.pool, auth.user_id, recommendation.id)
            .await?
            .is_some_and(|s| s.snapshot().is_selected());
        if !selected {
            return Err(CoreError::Validation(format!(
                "Recommendation {} is not selected",
                recommendation.id
            ))
            .into());
        }

        rows.push((recommendation.ad_id, recommendation.id, derive_rates(result.metrics)));
    }

    let rows = AdResultRepo::create_many(&state.pool, &rows).await?;

    tracing::info!(
        session_id = session.id,
        user_id = auth.user_id,
        count = rows.len(),
        "Ad results recorded",
    );

    Ok(created(rows))
}
