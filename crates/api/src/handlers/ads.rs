//! Handlers for stored ads.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use adsage_core::error::CoreError;
use adsage_core::types::DbId;
use adsage_db::models::ad::Ad;
use adsage_db::models::ad_result::AdResult;
use adsage_db::models::analysis::Analysis;
use adsage_db::models::recommendation::Recommendation;
use adsage_db::repositories::{AdRepo, AdResultRepo, AnalysisRepo, RecommendationRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// An ad with everything generated and recorded for it.
#[derive(Debug, Serialize)]
pub struct AdDetail {
    #[serde(flatten)]
    pub ad: Ad,
    pub recommendations: Vec<Recommendation>,
    pub analyses: Vec<Analysis>,
    pub results: Vec<AdResult>,
}

/// GET /api/v1/ads/{id}
pub async fn get_ad(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ad_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ad = AdRepo::find_by_id(&state.pool, ad_id)
        .await?
        .filter(|ad| ad.user_id == auth.user_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ad",
            id: ad_id,
        }))?;

    let recommendations = RecommendationRepo::list_by_ad(&state.pool, ad.id).await?;
    let analyses = AnalysisRepo::list_by_ad(&state.pool, ad.id).await?;
    let results = AdResultRepo::list_by_ad(&state.pool, ad.id).await?;

    Ok(Json(DataResponse {
        data: AdDetail {
            ad,
            recommendations,
            analyses,
            results,
        },
    }))
}
