use serde::Serialize;
use sqlx::FromRow;

use adsage_core::creative::Creative;
use adsage_core::types::{DbId, Timestamp};

/// A row from the `ads` table: the creative as submitted for analysis.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ad {
    pub id: DbId,
    pub user_id: DbId,
    pub session_id: Option<DbId>,
    pub headline: String,
    pub primary_text: String,
    pub call_to_action: String,
    pub objective: String,
    pub budget_amount: Option<f64>,
    pub age_min: i16,
    pub age_max: i16,
    pub gender: String,
    pub detailed_targeting: String,
    pub media_url: Option<String>,
    pub destination: Vec<String>,
    pub app_install_type: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for inserting an ad row from a session's creative.
#[derive(Debug, Clone)]
pub struct CreateAd<'a> {
    pub user_id: DbId,
    pub session_id: Option<DbId>,
    pub creative: &'a Creative,
}
