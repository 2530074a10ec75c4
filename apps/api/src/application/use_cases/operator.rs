use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::app_error::AppResult;
use crate::application::use_cases::pending_signup::normalize_email;
use crate::domain::entities::subscription_status::SubscriptionStatus;

#[async_trait]
pub trait OperatorRepo: Send + Sync {
    /// Insert unless an operator with the same email or checkout session id
    /// already exists. Returns `None` when the insert was skipped.
    async fn insert_if_absent(&self, operator: &NewOperator) -> AppResult<Option<OperatorProfile>>;

    async fn get_by_email(&self, email: &str) -> AppResult<Option<OperatorProfile>>;

    async fn get_by_checkout_session(&self, session_id: &str) -> AppResult<Option<OperatorProfile>>;

    /// Newest first.
    async fn list_all(&self) -> AppResult<Vec<OperatorProfile>>;
}

#[derive(Debug, Clone, Serialize)]
pub struct OperatorProfile {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub business_name: String,
    pub phone: String,
    pub slug: Option<String>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub stripe_checkout_session_id: Option<String>,
    pub subscription_status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOperator {
    pub email: String,
    pub password_hash: String,
    pub business_name: String,
    pub phone: String,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub stripe_checkout_session_id: String,
}

#[derive(Clone)]
pub struct OperatorUseCases {
    repo: Arc<dyn OperatorRepo>,
}

impl OperatorUseCases {
    pub fn new(repo: Arc<dyn OperatorRepo>) -> Self {
        Self { repo }
    }

    pub async fn create_if_absent(&self, mut operator: NewOperator) -> AppResult<Option<OperatorProfile>> {
        operator.email = normalize_email(&operator.email);
        self.repo.insert_if_absent(&operator).await
    }

    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<OperatorProfile>> {
        self.repo.get_by_email(&normalize_email(email)).await
    }

    pub async fn get_by_checkout_session(&self, session_id: &str) -> AppResult<Option<OperatorProfile>> {
        self.repo.get_by_checkout_session(session_id).await
    }

    pub async fn list_all(&self) -> AppResult<Vec<OperatorProfile>> {
        self.repo.list_all().await
    }
}
