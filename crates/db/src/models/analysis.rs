use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

use adsage_core::conversation::{ConversationEntry, Variation};
use adsage_core::creative::Creative;
use adsage_core::phase::Phase;
use adsage_core::types::{DbId, Timestamp};

use crate::models::ad::Ad;
use crate::models::analysis_session::AnalysisSession;
use crate::models::recommendation::Recommendation;

/// A row from the `ai_analyses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Analysis {
    pub id: DbId,
    pub ad_id: DbId,
    pub analysis: String,
    /// Mean variation score; `None` when the turn produced no variations.
    pub score: Option<f64>,
    pub analysis_type: String,
    pub recommendations: Json<Vec<Variation>>,
    pub created_at: Timestamp,
}

/// Input for inserting an analysis row.
#[derive(Debug, Clone)]
pub struct CreateAnalysis<'a> {
    pub ad_id: DbId,
    pub analysis: &'a str,
    pub score: Option<f64>,
    pub phase: Phase,
    pub recommendations: &'a [Variation],
}

/// Everything an initial-phase turn writes, persisted in one transaction.
#[derive(Debug)]
pub struct RecordInitialAnalysis<'a> {
    pub user_id: DbId,
    pub session_id: DbId,
    pub creative: &'a Creative,
    pub analysis: &'a str,
    pub score: Option<f64>,
    /// Parsed variations; hydrated with recommendation ids on success.
    pub variations: Vec<Variation>,
    /// Text of the assistant transcript entry.
    pub entry_content: String,
}

/// What [`RecordInitialAnalysis`] produced.
#[derive(Debug)]
pub struct InitialAnalysisRecord {
    pub ad: Ad,
    pub analysis: Analysis,
    pub recommendations: Vec<Recommendation>,
    /// Variations with their recommendation ids attached, in completion order.
    pub variations: Vec<Variation>,
    pub session: AnalysisSession,
    pub entry: ConversationEntry,
}
