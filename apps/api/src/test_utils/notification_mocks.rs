//! Scripted outbound adapters: email transport and checkout gateway.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::checkout_gateway::{CheckoutGateway, CheckoutRequest, CheckoutSession},
        use_cases::notification::{
            DeliveryFailure, EmailProviderConfig, EmailTransport, OutgoingEmail,
        },
    },
    domain::entities::email_provider::EmailProviderKind,
};

// ============================================================================
// ScriptedEmailTransport
// ============================================================================

/// Email transport that replays a fixed list of results, one per attempt.
/// Once the script runs out every further attempt succeeds.
#[derive(Default)]
pub struct ScriptedEmailTransport {
    script: Mutex<VecDeque<Result<(), DeliveryFailure>>>,
    attempts: Mutex<Vec<(EmailProviderKind, OutgoingEmail)>>,
    delivered: Mutex<Vec<OutgoingEmail>>,
}

impl ScriptedEmailTransport {
    pub fn new(script: Vec<Result<(), DeliveryFailure>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    /// Total number of send attempts, failed ones included.
    pub fn attempts(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    /// Provider used on each attempt, in order.
    pub fn providers(&self) -> Vec<EmailProviderKind> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .map(|(kind, _)| *kind)
            .collect()
    }

    /// Emails whose attempt succeeded.
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailTransport for ScriptedEmailTransport {
    async fn send(
        &self,
        config: &EmailProviderConfig,
        email: &OutgoingEmail,
    ) -> Result<(), DeliveryFailure> {
        self.attempts
            .lock()
            .unwrap()
            .push((config.kind(), email.clone()));

        let result = self.script.lock().unwrap().pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            self.delivered.lock().unwrap().push(email.clone());
        }
        result
    }
}

// ============================================================================
// FakeCheckoutGateway
// ============================================================================

/// Checkout gateway returning sequential `cs_test_N` sessions.
#[derive(Default)]
pub struct FakeCheckoutGateway {
    requests: Mutex<Vec<CheckoutRequest>>,
    fail_next: Mutex<bool>,
}

impl FakeCheckoutGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<CheckoutRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Make the next call fail with an internal error.
    pub fn fail_next(&self) {
        *self.fail_next.lock().unwrap() = true;
    }
}

#[async_trait]
impl CheckoutGateway for FakeCheckoutGateway {
    async fn create_subscription_checkout(&self, request: &CheckoutRequest) -> AppResult<CheckoutSession> {
        if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
            return Err(AppError::Internal("Stripe API error: card_declined".into()));
        }

        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        let id = format!("cs_test_{}", requests.len());
        Ok(CheckoutSession {
            url: Some(format!("https://checkout.stripe.test/{id}")),
            id,
        })
    }
}
