use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use adsage_core::metrics::PerformanceInput;
use adsage_core::types::{DbId, Timestamp};

/// A row from the `ad_results` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdResult {
    pub id: DbId,
    pub ad_id: DbId,
    pub recommendation_id: Option<DbId>,
    pub impressions: Option<i64>,
    pub clicks: Option<i64>,
    pub spend: Option<f64>,
    pub conversions: Option<i64>,
    pub conversion_rate: Option<f64>,
    pub ctr: Option<f64>,
    pub cpc: Option<f64>,
    pub cpm: Option<f64>,
    pub created_at: Timestamp,
}

/// Results for one recommendation, as submitted by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordAdResult {
    pub recommendation_id: DbId,
    #[serde(flatten)]
    pub metrics: PerformanceInput,
}

/// Latest result per recommendation, with the headline it ran under.
#[derive(Debug, Clone, FromRow)]
pub struct LatestResult {
    pub recommendation_id: DbId,
    pub headline: String,
    pub impressions: Option<i64>,
    pub clicks: Option<i64>,
    pub spend: Option<f64>,
    pub conversions: Option<i64>,
    pub conversion_rate: Option<f64>,
    pub ctr: Option<f64>,
    pub cpc: Option<f64>,
    pub cpm: Option<f64>,
}

impl LatestResult {
    pub fn metrics(&self) -> PerformanceInput {
        PerformanceInput {
            impressions: self.impressions,
            clicks: self.clicks,
            spend: self.spend,
            conversions: self.conversions,
            conversion_rate: self.conversion_rate,
            ctr: self.ctr,
            cpc: self.cpc,
            cpm: self.cpm,
        }
    }
}
