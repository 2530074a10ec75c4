use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::app_error::AppResult;

/// How long a pending signup stays claimable after its last submission.
pub const PENDING_SIGNUP_TTL_HOURS: i64 = 24;

#[async_trait]
pub trait PendingSignupRepo: Send + Sync {
    /// Insert, or overwrite the row with the same email. Overwriting clears the
    /// checkout session id and restarts the expiry window.
    async fn upsert(
        &self,
        email: &str,
        password_hash: &str,
        business_name: &str,
        phone: &str,
    ) -> AppResult<PendingSignupProfile>;

    async fn attach_checkout_session(
        &self,
        id: Uuid,
        session_id: &str,
    ) -> AppResult<Option<PendingSignupProfile>>;

    /// Only returns rows whose `expires_at` is still in the future.
    async fn get_active_by_id(&self, id: Uuid) -> AppResult<Option<PendingSignupProfile>>;

    async fn get_by_session_id(&self, session_id: &str) -> AppResult<Option<PendingSignupProfile>>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn delete_expired(&self) -> AppResult<u64>;
}

#[derive(Debug, Clone)]
pub struct PendingSignupProfile {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub business_name: String,
    pub phone: String,
    pub stripe_checkout_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct PendingSignupUseCases {
    repo: Arc<dyn PendingSignupRepo>,
}

impl PendingSignupUseCases {
    pub fn new(repo: Arc<dyn PendingSignupRepo>) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        business_name: &str,
        phone: &str,
    ) -> AppResult<PendingSignupProfile> {
        let pending = self
            .repo
            .upsert(&normalize_email(email), password_hash, business_name, phone)
            .await?;
        tracing::info!(pending_signup_id = %pending.id, "Pending signup recorded");
        Ok(pending)
    }

    pub async fn attach_checkout_session(
        &self,
        id: Uuid,
        session_id: &str,
    ) -> AppResult<Option<PendingSignupProfile>> {
        self.repo.attach_checkout_session(id, session_id).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<PendingSignupProfile>> {
        self.repo.get_active_by_id(id).await
    }

    pub async fn get_by_session_id(&self, session_id: &str) -> AppResult<Option<PendingSignupProfile>> {
        self.repo.get_by_session_id(session_id).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repo.delete(id).await
    }

    /// Remove every pending signup whose expiry has passed.
    pub async fn sweep_expired(&self) -> AppResult<u64> {
        let removed = self.repo.delete_expired().await?;
        if removed > 0 {
            tracing::info!(removed, "Expired pending signups removed");
        }
        Ok(removed)
    }
}
