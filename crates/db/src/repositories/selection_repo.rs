//! Repository for the `selected_recommendations` table.

use sqlx::PgPool;

use adsage_core::selection::SelectionStatus;
use adsage_core::types::DbId;

use crate::models::selection::{Selection, SelectionDetail};

const COLUMNS: &str = "\
    id, user_id, recommendation_id, status, deselected_at, created_at, updated_at";

pub struct SelectionRepo;

impl SelectionRepo {
    /// Current row for a user and recommendation, selected or not.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        recommendation_id: DbId,
    ) -> Result<Option<Selection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM selected_recommendations \
             WHERE user_id = $1 AND recommendation_id = $2"
        );
        sqlx::query_as::<_, Selection>(&query)
            .bind(user_id)
            .bind(recommendation_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn insert(
        pool: &PgPool,
        user_id: DbId,
        recommendation_id: DbId,
        status: SelectionStatus,
    ) -> Result<Selection, sqlx::Error> {
        let query = format!(
            "INSERT INTO selected_recommendations (user_id, recommendation_id, status) \
             VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Selection>(&query)
            .bind(user_id)
            .bind(recommendation_id)
            .bind(status.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM selected_recommendations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Soft-deselect, keeping the lifecycle status.
    pub async fn deselect(pool: &PgPool, id: DbId) -> Result<Option<Selection>, sqlx::Error> {
        let query = format!(
            "UPDATE selected_recommendations SET deselected_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Selection>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn reselect(pool: &PgPool, id: DbId) -> Result<Option<Selection>, sqlx::Error> {
        let query = format!(
            "UPDATE selected_recommendations SET deselected_at = NULL \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Selection>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: SelectionStatus,
    ) -> Result<Option<Selection>, sqlx::Error> {
        let query = format!(
            "UPDATE selected_recommendations SET status = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Selection>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Currently selected recommendations of a session, with their content.
    pub async fn list_for_session(
        pool: &PgPool,
        user_id: DbId,
        session_id: DbId,
    ) -> Result<Vec<SelectionDetail>, sqlx::Error> {
        sqlx::query_as::<_, SelectionDetail>(
            "SELECT s.id, s.recommendation_id, s.status, r.ad_id, r.headline, r.primary_text, \
                    r.call_to_action, r.targeting, r.budget_recommendation, r.ai_score, \
                    s.created_at, s.updated_at \
             FROM selected_recommendations s \
             JOIN ad_recommendations r ON r.id = s.recommendation_id \
             JOIN ads a ON a.id = r.ad_id \
             WHERE s.user_id = $1 AND a.session_id = $2 AND s.deselected_at IS NULL \
             ORDER BY s.created_at, s.id",
        )
        .bind(user_id)
        .bind(session_id)
        .fetch_all(pool)
        .await
    }

    /// Number of recommendations a user currently has selected in a session.
    /// Soft-deselected rows are not counted.
    pub async fn count_for_session(
        pool: &PgPool,
        user_id: DbId,
        session_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM selected_recommendations s \
             JOIN ad_recommendations r ON r.id = s.recommendation_id \
             JOIN ads a ON a.id = r.ad_id \
             WHERE s.user_id = $1 AND a.session_id = $2 AND s.deselected_at IS NULL",
        )
        .bind(user_id)
        .bind(session_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
