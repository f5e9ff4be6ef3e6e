use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use adsage_core::types::{DbId, Timestamp};

/// A row from the `ad_recommendations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Recommendation {
    pub id: DbId,
    pub ad_id: DbId,
    pub correlation_key: Uuid,
    pub ordinal: i32,
    pub headline: String,
    pub primary_text: String,
    pub call_to_action: String,
    pub targeting: String,
    pub budget_recommendation: String,
    pub ai_score: f64,
    pub raw_text: String,
    pub created_at: Timestamp,
}
