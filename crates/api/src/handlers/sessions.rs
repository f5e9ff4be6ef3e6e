//! Handlers for analysis sessions and their conversation turns.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use adsage_core::creative::{validate_creative, Creative};
use adsage_core::phase::{current_phase, Phase};
use adsage_core::session_key::generate_session_key;
use adsage_db::models::analysis_session::{AnalysisSession, CreateAnalysisSession};
use adsage_db::repositories::AnalysisSessionRepo;

use crate::advisor::load_owned_session;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{created, DataResponse};
use crate::state::AppState;

/// A session together with the phase derived from its transcript.
#[derive(Debug, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: AnalysisSession,
    pub phase: Phase,
}

impl From<AnalysisSession> for SessionView {
    fn from(session: AnalysisSession) -> Self {
        let phase = current_phase(session.history());
        Self { session, phase }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCreativeRequest {
    pub creative: Creative,
    pub company_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
    /// Ask for a review of recorded results instead of a plain follow-up.
    #[serde(default)]
    pub performance_review: bool,
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// POST /api/v1/sessions
pub async fn create_session(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateAnalysisSession>,
) -> AppResult<impl IntoResponse> {
    if let Some(creative) = &input.creative {
        validate_creative(creative)?;
    }

    let session_key = generate_session_key();
    let session = AnalysisSessionRepo::create(
        &state.pool,
        auth.user_id,
        &session_key,
        input.title.as_deref(),
        &input.company_description,
        input.creative.as_ref(),
    )
    .await?;

    tracing::info!(session_id = session.id, user_id = auth.user_id, "Session created");

    Ok(created(SessionView::from(session)))
}

/// GET /api/v1/sessions
///
/// The caller's sessions, most recently updated first.
pub async fn list_sessions(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let sessions = AnalysisSessionRepo::list_for_user(
        &state.pool,
        auth.user_id,
        params.limit(),
        params.offset(),
    )
    .await?;

    Ok(Json(DataResponse { data: sessions }))
}

/// GET /api/v1/sessions/{key}
///
/// `key` is the session key; a numeric id is accepted as a fallback.
pub async fn get_session(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<impl IntoResponse> {
    let session = load_owned_session(&state.pool, auth.user_id, &key).await?;
    Ok(Json(DataResponse {
        data: SessionView::from(session),
    }))
}

/// PUT /api/v1/sessions/{key}/creative
pub async fn update_creative(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(input): Json<UpdateCreativeRequest>,
) -> AppResult<impl IntoResponse> {
    validate_creative(&input.creative)?;

    let session = load_owned_session(&state.pool, auth.user_id, &key).await?;
    let session = AnalysisSessionRepo::update_creative(
        &state.pool,
        session.id,
        &input.creative,
        input.company_description.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::InternalError(format!("Session {key} vanished during update")))?;

    tracing::info!(session_id = session.id, user_id = auth.user_id, "Creative saved");

    Ok(Json(DataResponse {
        data: SessionView::from(session),
    }))
}

// ---------------------------------------------------------------------------
// Conversation turns
// ---------------------------------------------------------------------------

/// POST /api/v1/sessions/{key}/messages
///
/// Runs one conversation turn. The phase is derived from the transcript;
/// clients can only ask for a performance review.
pub async fn send_message(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(input): Json<SendMessageRequest>,
) -> AppResult<impl IntoResponse> {
    let session = load_owned_session(&state.pool, auth.user_id, &key).await?;
    let outcome = state
        .advisor
        .run_turn(auth.user_id, &session, &input.content, input.performance_review)
        .await?;

    Ok(Json(DataResponse { data: outcome }))
}
