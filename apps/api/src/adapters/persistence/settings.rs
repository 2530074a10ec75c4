use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::settings::{SettingsRepo, StoredSetting},
};

fn row_to_setting(row: sqlx::postgres::PgRow) -> StoredSetting {
    StoredSetting {
        category: row.get("category"),
        key: row.get("key"),
        value: row.get("value"),
        is_encrypted: row.get("is_encrypted"),
        updated_at: row.get("updated_at"),
        updated_by: row.get("updated_by"),
    }
}

#[async_trait]
impl SettingsRepo for PostgresPersistence {
    async fn get(&self, category: &str, key: &str) -> AppResult<Option<StoredSetting>> {
        let row = sqlx::query(
            r#"
            SELECT category, key, value, is_encrypted, updated_at, updated_by
            FROM system_settings
            WHERE category = $1 AND key = $2
            "#,
        )
        .bind(category)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row.map(row_to_setting))
    }

    async fn list_by_category(&self, category: &str) -> AppResult<Vec<StoredSetting>> {
        let rows = sqlx::query(
            r#"
            SELECT category, key, value, is_encrypted, updated_at, updated_by
            FROM system_settings
            WHERE category = $1
            ORDER BY key
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(rows.into_iter().map(row_to_setting).collect())
    }

    async fn upsert(
        &self,
        category: &str,
        key: &str,
        value: Option<&str>,
        is_encrypted: bool,
        updated_by: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO system_settings (category, key, value, is_encrypted, updated_by)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (category, key) DO UPDATE SET
                value = EXCLUDED.value,
                is_encrypted = EXCLUDED.is_encrypted,
                updated_by = EXCLUDED.updated_by,
                updated_at = NOW()
            "#,
        )
        .bind(category)
        .bind(key)
        .bind(value)
        .bind(is_encrypted)
        .bind(updated_by)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(())
    }

    async fn delete_category(&self, category: &str) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM system_settings WHERE category = $1")
            .bind(category)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected())
    }
}
