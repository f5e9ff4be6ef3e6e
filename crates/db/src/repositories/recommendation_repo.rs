//! Repository for the `ad_recommendations` table.

use sqlx::PgPool;

use adsage_core::conversation::Variation;
use adsage_core::types::DbId;

use crate::models::recommendation::Recommendation;

const COLUMNS: &str = "\
    id, ad_id, correlation_key, ordinal, headline, primary_text, call_to_action, \
    targeting, budget_recommendation, ai_score, raw_text, created_at";

/// [`COLUMNS`] qualified with the `r` alias for joins.
const R_COLUMNS: &str = "\
    r.id, r.ad_id, r.correlation_key, r.ordinal, r.headline, r.primary_text, \
    r.call_to_action, r.targeting, r.budget_recommendation, r.ai_score, r.raw_text, \
    r.created_at";

pub struct RecommendationRepo;

impl RecommendationRepo {
    /// Find a recommendation only if it was generated within the given session.
    pub async fn find_in_session(
        pool: &PgPool,
        id: DbId,
        session_id: DbId,
    ) -> Result<Option<Recommendation>, sqlx::Error> {
        let query = format!(
            "SELECT {R_COLUMNS} FROM ad_recommendations r \
             JOIN ads a ON a.id = r.ad_id \
             WHERE r.id = $1 AND a.session_id = $2"
        );
        sqlx::query_as::<_, Recommendation>(&query)
            .bind(id)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_ad(
        pool: &PgPool,
        ad_id: DbId,
    ) -> Result<Vec<Recommendation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ad_recommendations WHERE ad_id = $1 ORDER BY ordinal, id"
        );
        sqlx::query_as::<_, Recommendation>(&query)
            .bind(ad_id)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Insert one row per variation inside the caller's transaction.
    ///
    /// Rows are keyed by `(ad_id, correlation_key)`: inserting the same
    /// variation twice returns the existing row instead of a duplicate.
    pub(crate) async fn insert_many_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        ad_id: DbId,
        variations: &[Variation],
    ) -> Result<Vec<Recommendation>, sqlx::Error> {
        let insert = format!(
            "INSERT INTO ad_recommendations \
                (ad_id, correlation_key, ordinal, headline, primary_text, call_to_action, \
                 targeting, budget_recommendation, ai_score, raw_text) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT ON CONSTRAINT uq_ad_recommendations_ad_correlation DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let existing = format!(
            "SELECT {COLUMNS} FROM ad_recommendations WHERE ad_id = $1 AND correlation_key = $2"
        );

        let mut rows = Vec::with_capacity(variations.len());
        for (idx, v) in variations.iter().enumerate() {
            let inserted = sqlx::query_as::<_, Recommendation>(&insert)
                .bind(ad_id)
                .bind(v.correlation_key)
                .bind(idx as i32 + 1)
                .bind(&v.headline)
                .bind(&v.primary_text)
                .bind(&v.call_to_action)
                .bind(&v.targeting)
                .bind(&v.budget_recommendation)
                .bind(v.score)
                .bind(&v.raw_text)
                .fetch_optional(&mut **tx)
                .await?;

            let row = match inserted {
                Some(row) => row,
                None => {
                    sqlx::query_as::<_, Recommendation>(&existing)
                        .bind(ad_id)
                        .bind(v.correlation_key)
                        .fetch_one(&mut **tx)
                        .await?
                }
            };
            rows.push(row);
        }
        Ok(rows)
    }
}
