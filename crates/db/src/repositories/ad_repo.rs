//! Repository for the `ads` table.

use sqlx::PgPool;

use adsage_core::types::DbId;

use crate::models::ad::{Ad, CreateAd};

const COLUMNS: &str = "\
    id, user_id, session_id, headline, primary_text, call_to_action, objective, \
    budget_amount, age_min, age_max, gender, detailed_targeting, media_url, \
    destination, app_install_type, created_at, updated_at";

pub struct AdRepo;

impl AdRepo {
    pub async fn create(pool: &PgPool, input: &CreateAd<'_>) -> Result<Ad, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::create_inner(&mut *conn, input).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ad>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ads WHERE id = $1");
        sqlx::query_as::<_, Ad>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Most recent ad analysed in a session.
    pub async fn latest_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Option<Ad>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ads WHERE session_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        sqlx::query_as::<_, Ad>(&query)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    pub(crate) async fn create_inner(
        conn: &mut sqlx::PgConnection,
        input: &CreateAd<'_>,
    ) -> Result<Ad, sqlx::Error> {
        let c = input.creative;
        let query = format!(
            "INSERT INTO ads \
                (user_id, session_id, headline, primary_text, call_to_action, objective, \
                 budget_amount, age_min, age_max, gender, detailed_targeting, media_url, \
                 destination, app_install_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ad>(&query)
            .bind(input.user_id)
            .bind(input.session_id)
            .bind(&c.headline)
            .bind(&c.primary_text)
            .bind(&c.call_to_action)
            .bind(&c.objective)
            .bind(c.budget_amount)
            .bind(i16::from(c.age_min))
            .bind(i16::from(c.age_max))
            .bind(&c.gender)
            .bind(&c.detailed_targeting)
            .bind(&c.media_url)
            .bind(&c.destination)
            .bind(&c.app_install_type)
            .fetch_one(conn)
            .await
    }
}
