use serde::Serialize;
use sqlx::FromRow;

use adsage_core::types::{DbId, Timestamp};

/// A row from the `subscriptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub user_id: DbId,
    pub payments_subscription_id: String,
    pub plan_id: String,
    pub status: String,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for upserting a subscription from a webhook event.
#[derive(Debug, Clone)]
pub struct UpsertSubscription<'a> {
    pub user_id: DbId,
    pub payments_subscription_id: &'a str,
    pub plan_id: &'a str,
    pub status: &'a str,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
}
