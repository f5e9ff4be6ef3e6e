//! Repository for the `analysis_sessions` table.
//!
//! Transcript writes only ever append: [`AnalysisSessionRepo::append_entries`]
//! concatenates onto the stored JSONB array in a single statement, so two
//! concurrent turns cannot overwrite each other's entries.

use sqlx::types::Json;
use sqlx::PgPool;

use adsage_core::conversation::ConversationEntry;
use adsage_core::creative::Creative;
use adsage_core::session_key::is_valid_session_key;
use adsage_core::types::DbId;

use crate::models::analysis_session::{AnalysisSession, AnalysisSessionSummary};

pub(crate) const COLUMNS: &str = "\
    id, session_key, user_id, title, company_description, creative, messages, \
    created_at, updated_at";

/// Default title for sessions created without one.
pub const DEFAULT_TITLE: &str = "New analysis";

pub struct AnalysisSessionRepo;

impl AnalysisSessionRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        session_key: &str,
        title: Option<&str>,
        company_description: &str,
        creative: Option<&Creative>,
    ) -> Result<AnalysisSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO analysis_sessions \
                (session_key, user_id, title, company_description, creative) \
             VALUES ($1, $2, COALESCE($3, '{DEFAULT_TITLE}'), $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AnalysisSession>(&query)
            .bind(session_key)
            .bind(user_id)
            .bind(title)
            .bind(company_description)
            .bind(creative.map(Json))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_key(
        pool: &PgPool,
        session_key: &str,
    ) -> Result<Option<AnalysisSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM analysis_sessions WHERE session_key = $1");
        sqlx::query_as::<_, AnalysisSession>(&query)
            .bind(session_key)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AnalysisSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM analysis_sessions WHERE id = $1");
        sqlx::query_as::<_, AnalysisSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Look a session up by key, falling back to a numeric id.
    ///
    /// Strings that cannot be a session key skip the key lookup.
    pub async fn find_by_key_or_id(
        pool: &PgPool,
        key_or_id: &str,
    ) -> Result<Option<AnalysisSession>, sqlx::Error> {
        if is_valid_session_key(key_or_id) {
            if let Some(session) = Self::find_by_key(pool, key_or_id).await? {
                return Ok(Some(session));
            }
        }
        match key_or_id.parse::<DbId>() {
            Ok(id) => Self::find_by_id(pool, id).await,
            Err(_) => Ok(None),
        }
    }

    /// List a user's sessions, most recently active first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AnalysisSessionSummary>, sqlx::Error> {
        sqlx::query_as::<_, AnalysisSessionSummary>(
            "SELECT id, session_key, title, jsonb_array_length(messages) AS message_count, \
                    created_at, updated_at \
             FROM analysis_sessions WHERE user_id = $1 \
             ORDER BY updated_at DESC, id DESC \
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    pub async fn update_creative(
        pool: &PgPool,
        id: DbId,
        creative: &Creative,
        company_description: Option<&str>,
    ) -> Result<Option<AnalysisSession>, sqlx::Error> {
        let query = format!(
            "UPDATE analysis_sessions \
             SET creative = $2, company_description = COALESCE($3, company_description) \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AnalysisSession>(&query)
            .bind(id)
            .bind(Json(creative))
            .bind(company_description)
            .fetch_optional(pool)
            .await
    }

    /// Append entries to the transcript atomically.
    pub async fn append_entries(
        pool: &PgPool,
        id: DbId,
        entries: &[ConversationEntry],
    ) -> Result<Option<AnalysisSession>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::append_entries_inner(&mut *conn, id, entries).await
    }

    pub(crate) async fn append_entries_inner(
        conn: &mut sqlx::PgConnection,
        id: DbId,
        entries: &[ConversationEntry],
    ) -> Result<Option<AnalysisSession>, sqlx::Error> {
        let query = format!(
            "UPDATE analysis_sessions SET messages = messages || $2::jsonb \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AnalysisSession>(&query)
            .bind(id)
            .bind(Json(entries))
            .fetch_optional(conn)
            .await
    }
}
