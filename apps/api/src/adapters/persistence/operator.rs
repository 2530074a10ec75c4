use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::operator::{NewOperator, OperatorProfile, OperatorRepo},
    domain::entities::subscription_status::SubscriptionStatus,
};

const COLUMNS: &str = "id, email, password_hash, business_name, phone, slug, stripe_customer_id, \
     stripe_subscription_id, stripe_checkout_session_id, subscription_status, created_at, updated_at";

fn row_to_profile(row: sqlx::postgres::PgRow) -> OperatorProfile {
    let status: String = row.get("subscription_status");
    OperatorProfile {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        business_name: row.get("business_name"),
        phone: row.get("phone"),
        slug: row.get("slug"),
        stripe_customer_id: row.get("stripe_customer_id"),
        stripe_subscription_id: row.get("stripe_subscription_id"),
        stripe_checkout_session_id: row.get("stripe_checkout_session_id"),
        subscription_status: SubscriptionStatus::from_db(&status),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl OperatorRepo for PostgresPersistence {
    async fn insert_if_absent(&self, operator: &NewOperator) -> AppResult<Option<OperatorProfile>> {
        // Unique email and checkout session constraints turn replays into no-ops.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO operators (
                email, password_hash, business_name, phone,
                stripe_customer_id, stripe_subscription_id, stripe_checkout_session_id,
                subscription_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT DO NOTHING
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&operator.email)
        .bind(&operator.password_hash)
        .bind(&operator.business_name)
        .bind(&operator.phone)
        .bind(&operator.stripe_customer_id)
        .bind(&operator.stripe_subscription_id)
        .bind(&operator.stripe_checkout_session_id)
        .bind(SubscriptionStatus::Active.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row.map(row_to_profile))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<OperatorProfile>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM operators WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(row.map(row_to_profile))
    }

    async fn get_by_checkout_session(&self, session_id: &str) -> AppResult<Option<OperatorProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM operators WHERE stripe_checkout_session_id = $1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row.map(row_to_profile))
    }

    async fn list_all(&self) -> AppResult<Vec<OperatorProfile>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM operators ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(rows.into_iter().map(row_to_profile).collect())
    }
}
