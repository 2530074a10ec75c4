use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::pending_signup::{
        PENDING_SIGNUP_TTL_HOURS, PendingSignupProfile, PendingSignupRepo,
    },
};

const COLUMNS: &str =
    "id, email, password_hash, business_name, phone, stripe_checkout_session_id, created_at, expires_at";

fn row_to_profile(row: sqlx::postgres::PgRow) -> PendingSignupProfile {
    PendingSignupProfile {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        business_name: row.get("business_name"),
        phone: row.get("phone"),
        stripe_checkout_session_id: row.get("stripe_checkout_session_id"),
        created_at: row.get("created_at"),
        expires_at: row.get("expires_at"),
    }
}

#[async_trait]
impl PendingSignupRepo for PostgresPersistence {
    async fn upsert(
        &self,
        email: &str,
        password_hash: &str,
        business_name: &str,
        phone: &str,
    ) -> AppResult<PendingSignupProfile> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO pending_signups (email, password_hash, business_name, phone, created_at, expires_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW() + make_interval(hours => $5))
            ON CONFLICT (email) DO UPDATE SET
                password_hash = EXCLUDED.password_hash,
                business_name = EXCLUDED.business_name,
                phone = EXCLUDED.phone,
                stripe_checkout_session_id = NULL,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at
            RETURNING {COLUMNS}
            "#
        ))
        .bind(email)
        .bind(password_hash)
        .bind(business_name)
        .bind(phone)
        .bind(PENDING_SIGNUP_TTL_HOURS as i32)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row_to_profile(row))
    }

    async fn attach_checkout_session(
        &self,
        id: Uuid,
        session_id: &str,
    ) -> AppResult<Option<PendingSignupProfile>> {
        let row = sqlx::query(&format!(
            "UPDATE pending_signups SET stripe_checkout_session_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row.map(row_to_profile))
    }

    async fn get_active_by_id(&self, id: Uuid) -> AppResult<Option<PendingSignupProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM pending_signups WHERE id = $1 AND expires_at > NOW()"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row.map(row_to_profile))
    }

    async fn get_by_session_id(&self, session_id: &str) -> AppResult<Option<PendingSignupProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM pending_signups WHERE stripe_checkout_session_id = $1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row.map(row_to_profile))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM pending_signups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM pending_signups WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected())
    }
}
