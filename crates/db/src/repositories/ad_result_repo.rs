//! Repository for the `ad_results` table.

use sqlx::PgPool;

use adsage_core::metrics::PerformanceInput;
use adsage_core::types::DbId;

use crate::models::ad_result::{AdResult, LatestResult};

const COLUMNS: &str = "\
    id, ad_id, recommendation_id, impressions, clicks, spend, conversions, \
    conversion_rate, ctr, cpc, cpm, created_at";

pub struct AdResultRepo;

impl AdResultRepo {
    /// Insert several results in one transaction.
    ///
    /// Each item is `(ad_id, recommendation_id, metrics)`.
    pub async fn create_many(
        pool: &PgPool,
        items: &[(DbId, DbId, PerformanceInput)],
    ) -> Result<Vec<AdResult>, sqlx::Error> {
        let query = format!(
            "INSERT INTO ad_results \
                (ad_id, recommendation_id, impressions, clicks, spend, conversions, \
                 conversion_rate, ctr, cpc, cpm) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let mut rows = Vec::with_capacity(items.len());
        for (ad_id, recommendation_id, m) in items {
            let row = sqlx::query_as::<_, AdResult>(&query)
                .bind(ad_id)
                .bind(recommendation_id)
                .bind(m.impressions)
                .bind(m.clicks)
                .bind(m.spend)
                .bind(m.conversions)
                .bind(m.conversion_rate)
                .bind(m.ctr)
                .bind(m.cpc)
                .bind(m.cpm)
                .fetch_one(&mut *tx)
                .await?;
            rows.push(row);
        }
        tx.commit().await?;
        Ok(rows)
    }

    pub async fn list_by_ad(pool: &PgPool, ad_id: DbId) -> Result<Vec<AdResult>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ad_results WHERE ad_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, AdResult>(&query)
            .bind(ad_id)
            .fetch_all(pool)
            .await
    }

    /// Most recent result per recommendation across a session's ads.
    pub async fn latest_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<LatestResult>, sqlx::Error> {
        sqlx::query_as::<_, LatestResult>(
            "SELECT DISTINCT ON (res.recommendation_id) \
                    res.recommendation_id, r.headline, res.impressions, res.clicks, res.spend, \
                    res.conversions, res.conversion_rate, res.ctr, res.cpc, res.cpm \
             FROM ad_results res \
             JOIN ad_recommendations r ON r.id = res.recommendation_id \
             JOIN ads a ON a.id = res.ad_id \
             WHERE a.session_id = $1 \
             ORDER BY res.recommendation_id, res.created_at DESC, res.id DESC",
        )
        .bind(session_id)
        .fetch_all(pool)
        .await
    }
}
