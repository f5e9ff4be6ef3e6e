//! Repository for the `users` table.

use sqlx::PgPool;

use adsage_core::types::DbId;

use crate::models::user::User;

const COLUMNS: &str = "\
    id, auth_subject, email, name, plan_id, payments_customer_id, \
    created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    /// Return the user for an auth subject, creating it on first sight.
    ///
    /// A known email is never cleared by a token that lacks one.
    pub async fn ensure(
        pool: &PgPool,
        auth_subject: &str,
        email: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (auth_subject, email) VALUES ($1, $2) \
             ON CONFLICT (auth_subject) DO UPDATE \
                SET email = COALESCE(EXCLUDED.email, users.email) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(auth_subject)
            .bind(email)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_customer_id(
        pool: &PgPool,
        customer_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE payments_customer_id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(customer_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_customer_id(
        pool: &PgPool,
        id: DbId,
        customer_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET payments_customer_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(customer_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_plan(pool: &PgPool, id: DbId, plan_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET plan_id = $2 WHERE id = $1")
            .bind(id)
            .bind(plan_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
