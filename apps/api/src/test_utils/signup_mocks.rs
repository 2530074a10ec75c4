//! In-memory repositories for the signup funnel (pending signups, operators,
//! onboarding responses).

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    application::use_cases::{
        onboarding::{OnboardingRepo, OnboardingResponseProfile},
        operator::{NewOperator, OperatorProfile, OperatorRepo},
        pending_signup::{PENDING_SIGNUP_TTL_HOURS, PendingSignupProfile, PendingSignupRepo},
    },
    domain::entities::subscription_status::SubscriptionStatus,
};

// ============================================================================
// InMemoryPendingSignupRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryPendingSignupRepo {
    pub signups: Mutex<HashMap<Uuid, PendingSignupProfile>>,
    remove_before_attach: AtomicBool,
}

impl InMemoryPendingSignupRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.signups.lock().unwrap().len()
    }

    pub fn get_all(&self) -> Vec<PendingSignupProfile> {
        self.signups.lock().unwrap().values().cloned().collect()
    }

    /// The next `attach_checkout_session` finds its row already deleted.
    pub fn remove_before_next_attach(&self) {
        self.remove_before_attach.store(true, Ordering::SeqCst);
    }

    /// Move the expiry of a row into the past.
    pub fn expire(&self, id: Uuid) {
        if let Some(row) = self.signups.lock().unwrap().get_mut(&id) {
            row.expires_at = Utc::now() - Duration::minutes(1);
        }
    }
}

#[async_trait]
impl PendingSignupRepo for InMemoryPendingSignupRepo {
    async fn upsert(
        &self,
        email: &str,
        password_hash: &str,
        business_name: &str,
        phone: &str,
    ) -> AppResult<PendingSignupProfile> {
        let now = Utc::now();
        let mut signups = self.signups.lock().unwrap();
        let id = signups
            .values()
            .find(|s| s.email == email)
            .map(|s| s.id)
            .unwrap_or_else(Uuid::new_v4);

        let row = PendingSignupProfile {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            business_name: business_name.to_string(),
            phone: phone.to_string(),
            stripe_checkout_session_id: None,
            created_at: now,
            expires_at: now + Duration::hours(PENDING_SIGNUP_TTL_HOURS),
        };
        signups.insert(id, row.clone());
        Ok(row)
    }

    async fn attach_checkout_session(
        &self,
        id: Uuid,
        session_id: &str,
    ) -> AppResult<Option<PendingSignupProfile>> {
        let mut signups = self.signups.lock().unwrap();
        if self.remove_before_attach.swap(false, Ordering::SeqCst) {
            signups.remove(&id);
        }
        Ok(signups.get_mut(&id).map(|row| {
            row.stripe_checkout_session_id = Some(session_id.to_string());
            row.clone()
        }))
    }

    async fn get_active_by_id(&self, id: Uuid) -> AppResult<Option<PendingSignupProfile>> {
        let now = Utc::now();
        Ok(self
            .signups
            .lock()
            .unwrap()
            .get(&id)
            .filter(|row| row.expires_at > now)
            .cloned())
    }

    async fn get_by_session_id(&self, session_id: &str) -> AppResult<Option<PendingSignupProfile>> {
        Ok(self
            .signups
            .lock()
            .unwrap()
            .values()
            .find(|row| row.stripe_checkout_session_id.as_deref() == Some(session_id))
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.signups.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        let now = Utc::now();
        let mut signups = self.signups.lock().unwrap();
        let before = signups.len();
        signups.retain(|_, row| row.expires_at > now);
        Ok((before - signups.len()) as u64)
    }
}

// ============================================================================
// InMemoryOperatorRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryOperatorRepo {
    pub operators: Mutex<Vec<OperatorProfile>>,
}

impl InMemoryOperatorRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.operators.lock().unwrap().len()
    }

    pub fn get_all(&self) -> Vec<OperatorProfile> {
        self.operators.lock().unwrap().clone()
    }

    /// Seed an existing operator.
    pub fn insert(&self, operator: OperatorProfile) {
        self.operators.lock().unwrap().push(operator);
    }
}

#[async_trait]
impl OperatorRepo for InMemoryOperatorRepo {
    async fn insert_if_absent(&self, operator: &NewOperator) -> AppResult<Option<OperatorProfile>> {
        let mut operators = self.operators.lock().unwrap();
        let taken = operators.iter().any(|o| {
            o.email == operator.email
                || o.stripe_checkout_session_id.as_deref()
                    == Some(operator.stripe_checkout_session_id.as_str())
        });
        if taken {
            return Ok(None);
        }

        let now = Utc::now();
        let profile = OperatorProfile {
            id: Uuid::new_v4(),
            email: operator.email.clone(),
            password_hash: operator.password_hash.clone(),
            business_name: operator.business_name.clone(),
            phone: operator.phone.clone(),
            slug: None,
            stripe_customer_id: operator.stripe_customer_id.clone(),
            stripe_subscription_id: operator.stripe_subscription_id.clone(),
            stripe_checkout_session_id: Some(operator.stripe_checkout_session_id.clone()),
            subscription_status: SubscriptionStatus::Active,
            created_at: now,
            updated_at: now,
        };
        operators.push(profile.clone());
        Ok(Some(profile))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<OperatorProfile>> {
        Ok(self
            .operators
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.email == email)
            .cloned())
    }

    async fn get_by_checkout_session(&self, session_id: &str) -> AppResult<Option<OperatorProfile>> {
        Ok(self
            .operators
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.stripe_checkout_session_id.as_deref() == Some(session_id))
            .cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<OperatorProfile>> {
        let mut operators = self.get_all();
        operators.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(operators)
    }
}

// ============================================================================
// InMemoryOnboardingRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryOnboardingRepo {
    pub responses: Mutex<Vec<OnboardingResponseProfile>>,
}

impl InMemoryOnboardingRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    pub fn get_all(&self) -> Vec<OnboardingResponseProfile> {
        self.responses.lock().unwrap().clone()
    }
}

#[async_trait]
impl OnboardingRepo for InMemoryOnboardingRepo {
    async fn insert(
        &self,
        operator_id: Option<Uuid>,
        session_id: Option<&str>,
        responses: &BTreeMap<String, String>,
    ) -> AppResult<OnboardingResponseProfile> {
        let profile = OnboardingResponseProfile {
            id: Uuid::new_v4(),
            operator_id,
            session_id: session_id.map(str::to_string),
            responses: responses.clone(),
            submitted_at: Utc::now(),
        };
        self.responses.lock().unwrap().push(profile.clone());
        Ok(profile)
    }
}
