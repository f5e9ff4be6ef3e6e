//! Repository for the `subscriptions` table.
//!
//! Webhook handlers change the subscription row and the user's plan
//! together, so both writes share a transaction.

use sqlx::PgPool;

use adsage_core::billing::FREE_PLAN;
use adsage_core::types::DbId;

use crate::models::subscription::{Subscription, UpsertSubscription};

const COLUMNS: &str = "\
    id, user_id, payments_subscription_id, plan_id, status, \
    current_period_start, current_period_end, created_at, updated_at";

pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Insert or update a subscription and move the user onto its plan.
    pub async fn upsert_and_set_plan(
        pool: &PgPool,
        input: &UpsertSubscription<'_>,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions \
                (user_id, payments_subscription_id, plan_id, status, \
                 current_period_start, current_period_end) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (payments_subscription_id) DO UPDATE SET \
                user_id = EXCLUDED.user_id, \
                plan_id = EXCLUDED.plan_id, \
                status = EXCLUDED.status, \
                current_period_start = EXCLUDED.current_period_start, \
                current_period_end = EXCLUDED.current_period_end \
             RETURNING {COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let subscription = sqlx::query_as::<_, Subscription>(&query)
            .bind(input.user_id)
            .bind(input.payments_subscription_id)
            .bind(input.plan_id)
            .bind(input.status)
            .bind(input.current_period_start)
            .bind(input.current_period_end)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE users SET plan_id = $2 WHERE id = $1")
            .bind(input.user_id)
            .bind(input.plan_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(subscription)
    }

    /// Mark a subscription canceled and put the user back on the free plan.
    ///
    /// Returns `false` if the subscription was never recorded; the plan is
    /// reset either way.
    pub async fn cancel_and_reset_plan(
        pool: &PgPool,
        user_id: DbId,
        payments_subscription_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = sqlx::query(
            "UPDATE subscriptions SET status = 'canceled' WHERE payments_subscription_id = $1",
        )
        .bind(payments_subscription_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET plan_id = $2 WHERE id = $1")
            .bind(user_id)
            .bind(FREE_PLAN)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_latest_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subscriptions WHERE user_id = $1 \
             ORDER BY updated_at DESC, id DESC LIMIT 1"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
