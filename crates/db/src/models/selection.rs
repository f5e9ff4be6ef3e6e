use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use adsage_core::selection::{SelectionSnapshot, SelectionStatus};
use adsage_core::types::{DbId, Timestamp};

/// A row from the `selected_recommendations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Selection {
    pub id: DbId,
    pub user_id: DbId,
    pub recommendation_id: DbId,
    pub status: String,
    pub deselected_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Selection {
    /// Toggle-relevant view of the row. Unknown statuses read as draft.
    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            status: SelectionStatus::parse(&self.status).unwrap_or(SelectionStatus::Draft),
            deselected_at: self.deselected_at,
        }
    }
}

/// A selected recommendation joined with its content.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SelectionDetail {
    pub id: DbId,
    pub recommendation_id: DbId,
    pub status: String,
    pub ad_id: DbId,
    pub headline: String,
    pub primary_text: String,
    pub call_to_action: String,
    pub targeting: String,
    pub budget_recommendation: String,
    pub ai_score: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for an explicit status change.
#[derive(Debug, Deserialize)]
pub struct UpdateSelectionStatus {
    pub status: String,
}
