//! Repository for the `ai_analyses` table, plus the transactional write of
//! a complete initial-phase turn.

use std::collections::HashMap;

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use adsage_core::conversation::ConversationEntry;
use adsage_core::phase::Phase;
use adsage_core::types::DbId;

use crate::models::ad::CreateAd;
use crate::models::analysis::{Analysis, CreateAnalysis, InitialAnalysisRecord, RecordInitialAnalysis};
use crate::repositories::{AdRepo, AnalysisSessionRepo, RecommendationRepo};

const COLUMNS: &str = "id, ad_id, analysis, score, analysis_type, recommendations, created_at";

pub struct AnalysisRepo;

impl AnalysisRepo {
    pub async fn create(pool: &PgPool, input: &CreateAnalysis<'_>) -> Result<Analysis, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::create_inner(&mut *conn, input).await
    }

    pub async fn list_by_ad(pool: &PgPool, ad_id: DbId) -> Result<Vec<Analysis>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM ai_analyses WHERE ad_id = $1 ORDER BY created_at, id");
        sqlx::query_as::<_, Analysis>(&query)
            .bind(ad_id)
            .fetch_all(pool)
            .await
    }

    /// Persist an initial-phase turn in one transaction:
    ///
    /// 1. the ad row for the session's creative
    /// 2. one recommendation per variation
    /// 3. the analysis row with the aggregate score
    /// 4. the assistant transcript entry, with variations hydrated by
    ///    correlation key
    ///
    /// Nothing is written if any step fails.
    pub async fn record_initial(
        pool: &PgPool,
        input: RecordInitialAnalysis<'_>,
    ) -> Result<InitialAnalysisRecord, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let ad = AdRepo::create_inner(
            &mut *tx,
            &CreateAd {
                user_id: input.user_id,
                session_id: Some(input.session_id),
                creative: input.creative,
            },
        )
        .await?;

        let recommendations =
            RecommendationRepo::insert_many_inner(&mut tx, ad.id, &input.variations).await?;

        let ids_by_key: HashMap<Uuid, DbId> = recommendations
            .iter()
            .map(|r| (r.correlation_key, r.id))
            .collect();
        let mut variations = input.variations;
        for variation in &mut variations {
            if let Some(id) = ids_by_key.get(&variation.correlation_key) {
                variation.hydrate(*id);
            }
        }

        let analysis = Self::create_inner(
            &mut *tx,
            &CreateAnalysis {
                ad_id: ad.id,
                analysis: input.analysis,
                score: input.score,
                phase: Phase::Initial,
                recommendations: &variations,
            },
        )
        .await?;

        let entry =
            ConversationEntry::assistant_with_variations(input.entry_content, variations.clone());
        let session = AnalysisSessionRepo::append_entries_inner(
            &mut *tx,
            input.session_id,
            std::slice::from_ref(&entry),
        )
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

        tx.commit().await?;

        tracing::debug!(
            session_id = session.id,
            ad_id = ad.id,
            recommendations = recommendations.len(),
            "Initial analysis committed",
        );

        Ok(InitialAnalysisRecord {
            ad,
            analysis,
            recommendations,
            variations,
            session,
            entry,
        })
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    pub(crate) async fn create_inner(
        conn: &mut sqlx::PgConnection,
        input: &CreateAnalysis<'_>,
    ) -> Result<Analysis, sqlx::Error> {
        let query = format!(
            "INSERT INTO ai_analyses (ad_id, analysis, score, analysis_type, recommendations) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Analysis>(&query)
            .bind(input.ad_id)
            .bind(input.analysis)
            .bind(input.score)
            .bind(input.phase.as_str())
            .bind(Json(input.recommendations))
            .fetch_one(conn)
            .await
    }
}
