use serde::Serialize;
use sqlx::FromRow;

use adsage_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    /// Subject claim issued by the hosted auth provider.
    #[serde(skip_serializing)]
    pub auth_subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub plan_id: String,
    #[serde(skip_serializing)]
    pub payments_customer_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
