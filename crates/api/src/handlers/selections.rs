//! Handlers for recommendation selections.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use adsage_core::error::CoreError;
use adsage_core::selection::{validate_status_transition, SelectionStatus};
use adsage_core::types::DbId;
use adsage_db::models::selection::UpdateSelectionStatus;
use adsage_db::repositories::SelectionRepo;

use crate::advisor::load_owned_session;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/sessions/{key}/selections
///
/// Currently selected recommendations with their content.
pub async fn list_selections(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<impl IntoResponse> {
    let session = load_owned_session(&state.pool, auth.user_id, &key).await?;
    let selections = SelectionRepo::list_for_session(&state.pool, auth.user_id, session.id).await?;
    Ok(Json(DataResponse { data: selections }))
}

/// POST /api/v1/sessions/{key}/selections/{recommendation_id}
///
/// Toggles the selection. The response carries the follow-up turn when
/// this was the first selection in the session.
pub async fn toggle_selection(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((key, recommendation_id)): Path<(String, DbId)>,
) -> AppResult<impl IntoResponse> {
    let session = load_owned_session(&state.pool, auth.user_id, &key).await?;
    let outcome = state
        .advisor
        .toggle_selection(auth.user_id, &session, recommendation_id)
        .await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// PUT /api/v1/selections/{recommendation_id}/status
///
/// Explicit lifecycle change, e.g. `draft` to `active` when the ad goes live.
pub async fn update_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(recommendation_id): Path<DbId>,
    Json(input): Json<UpdateSelectionStatus>,
) -> AppResult<impl IntoResponse> {
    let target = SelectionStatus::parse(&input.status)?;

    let selection = SelectionRepo::find(&state.pool, auth.user_id, recommendation_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Selection",
            id: recommendation_id,
        }))?;

    validate_status_transition(selection.snapshot().status, target)?;

    let updated = SelectionRepo::update_status(&state.pool, selection.id, target)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Selection",
            id: recommendation_id,
        }))?;

    tracing::info!(
        selection_id = updated.id,
        user_id = auth.user_id,
        status = %target,
        "Selection status updated",
    );

    Ok(Json(DataResponse { data: updated }))
}
