use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::{PostgresPersistence, parse_json_with_fallback},
    app_error::{AppError, AppResult},
    application::use_cases::onboarding::{OnboardingRepo, OnboardingResponseProfile},
};

fn row_to_profile(row: sqlx::postgres::PgRow) -> OnboardingResponseProfile {
    let id: Uuid = row.get("id");
    let responses: serde_json::Value = row.get("responses");
    OnboardingResponseProfile {
        id,
        operator_id: row.get("operator_id"),
        session_id: row.get("session_id"),
        responses: parse_json_with_fallback(
            &responses,
            "responses",
            "onboarding_response",
            &id.to_string(),
        ),
        submitted_at: row.get("submitted_at"),
    }
}

#[async_trait]
impl OnboardingRepo for PostgresPersistence {
    async fn insert(
        &self,
        operator_id: Option<Uuid>,
        session_id: Option<&str>,
        responses: &BTreeMap<String, String>,
    ) -> AppResult<OnboardingResponseProfile> {
        let responses = serde_json::to_value(responses)
            .map_err(|e| AppError::Internal(format!("Failed to encode responses: {e}")))?;

        let row = sqlx::query(
            r#"
            INSERT INTO onboarding_responses (operator_id, session_id, responses)
            VALUES ($1, $2, $3)
            RETURNING id, operator_id, session_id, responses, submitted_at
            "#,
        )
        .bind(operator_id)
        .bind(session_id)
        .bind(responses)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row_to_profile(row))
    }
}
