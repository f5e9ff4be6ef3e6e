//! Analysis session rows.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use adsage_core::conversation::ConversationEntry;
use adsage_core::creative::Creative;
use adsage_core::types::{DbId, Timestamp};

/// A row from the `analysis_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnalysisSession {
    pub id: DbId,
    pub session_key: String,
    pub user_id: DbId,
    pub title: String,
    pub company_description: String,
    pub creative: Option<Json<Creative>>,
    pub messages: Json<Vec<ConversationEntry>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AnalysisSession {
    pub fn creative(&self) -> Option<&Creative> {
        self.creative.as_ref().map(|c| &c.0)
    }

    pub fn history(&self) -> &[ConversationEntry] {
        &self.messages.0
    }
}

/// DTO for creating a session.
#[derive(Debug, Deserialize)]
pub struct CreateAnalysisSession {
    pub title: Option<String>,
    #[serde(default)]
    pub company_description: String,
    pub creative: Option<Creative>,
}

/// Lightweight listing row without the transcript.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnalysisSessionSummary {
    pub id: DbId,
    pub session_key: String,
    pub title: String,
    pub message_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
