//! Test app state builder for HTTP-level integration testing.
//!
//! This module provides `TestAppStateBuilder` which creates a complete `AppState`
//! backed by in-memory repositories and scripted outbound adapters.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use secrecy::SecretString;

use crate::{
    adapters::http::app_state::AppState,
    application::use_cases::{
        checkout::{CheckoutUseCases, PriceDefaults},
        notification::{MAX_SEND_ATTEMPTS, NotificationUseCases, RetryPolicy},
        onboarding::OnboardingUseCases,
        operator::{OperatorProfile, OperatorUseCases},
        pending_signup::PendingSignupUseCases,
        settings::SettingsUseCases,
        signup::SignupUseCases,
        stripe_webhook::StripeWebhookUseCases,
    },
    domain::entities::stripe_mode::StripeMode,
    infra::config::{AppConfig, DEFAULT_NOTIFY_EMAIL},
    test_utils::{
        FakeCheckoutGateway, InMemoryOnboardingRepo, InMemoryOperatorRepo,
        InMemoryPendingSignupRepo, InMemorySettingsRepo, ScriptedEmailTransport, TEST_SETTINGS_KEY,
        seed_smtp_rows, test_cipher,
    },
};

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";
pub const TEST_ADMIN_SECRET: &str = "test-admin-jwt-secret-at-least-32-bytes";

/// Handles to the in-memory adapters behind a built `AppState`.
pub struct TestMocks {
    pub settings_repo: Arc<InMemorySettingsRepo>,
    pub pending_repo: Arc<InMemoryPendingSignupRepo>,
    pub operator_repo: Arc<InMemoryOperatorRepo>,
    pub onboarding_repo: Arc<InMemoryOnboardingRepo>,
    pub gateway: Arc<FakeCheckoutGateway>,
    pub transport: Arc<ScriptedEmailTransport>,
}

/// Builder for creating test AppState with in-memory mocks.
pub struct TestAppStateBuilder {
    operators: Vec<OperatorProfile>,
    smtp_settings: bool,
    webhook_secret: Option<String>,
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            operators: Vec::new(),
            smtp_settings: false,
            webhook_secret: Some(TEST_WEBHOOK_SECRET.to_string()),
        }
    }

    pub fn with_operator(mut self, operator: OperatorProfile) -> Self {
        self.operators.push(operator);
        self
    }

    /// Configure the `email` category for SMTP so notifications can be sent.
    pub fn with_smtp_settings(mut self) -> Self {
        self.smtp_settings = true;
        self
    }

    pub fn without_webhook_secret(mut self) -> Self {
        self.webhook_secret = None;
        self
    }

    pub fn build(self) -> AppState {
        self.build_with_mocks().0
    }

    pub fn build_with_mocks(self) -> (AppState, TestMocks) {
        let mocks = TestMocks {
            settings_repo: Arc::new(InMemorySettingsRepo::new()),
            pending_repo: Arc::new(InMemoryPendingSignupRepo::new()),
            operator_repo: Arc::new(InMemoryOperatorRepo::new()),
            onboarding_repo: Arc::new(InMemoryOnboardingRepo::new()),
            gateway: Arc::new(FakeCheckoutGateway::new()),
            transport: Arc::new(ScriptedEmailTransport::new(Vec::new())),
        };

        for operator in self.operators {
            mocks.operator_repo.insert(operator);
        }
        if self.smtp_settings {
            seed_smtp_rows(&mocks.settings_repo);
        }

        let config = Arc::new(test_config(self.webhook_secret));

        let settings_use_cases = Arc::new(SettingsUseCases::new(
            mocks.settings_repo.clone(),
            Arc::new(test_cipher()),
        ));
        let pending_signup_use_cases =
            Arc::new(PendingSignupUseCases::new(mocks.pending_repo.clone()));
        let operator_use_cases = Arc::new(OperatorUseCases::new(mocks.operator_repo.clone()));
        let onboarding_use_cases = Arc::new(OnboardingUseCases::new(
            mocks.onboarding_repo.clone(),
            operator_use_cases.clone(),
            settings_use_cases.clone(),
        ));
        let checkout_use_cases = Arc::new(CheckoutUseCases::new(
            settings_use_cases.clone(),
            mocks.gateway.clone(),
            config.stripe_prices.clone(),
            config.app_url.as_str(),
        ));
        let signup_use_cases = Arc::new(SignupUseCases::new(
            pending_signup_use_cases.clone(),
            operator_use_cases.clone(),
            checkout_use_cases.clone(),
        ));
        let notification_use_cases = Arc::new(NotificationUseCases::with_retry_policy(
            settings_use_cases.clone(),
            mocks.transport.clone(),
            RetryPolicy {
                max_attempts: MAX_SEND_ATTEMPTS,
                delays: vec![Duration::ZERO; MAX_SEND_ATTEMPTS as usize],
            },
        ));
        let stripe_webhook_use_cases = Arc::new(StripeWebhookUseCases::new(
            operator_use_cases.clone(),
            pending_signup_use_cases.clone(),
            notification_use_cases.clone(),
            config.stripe_webhook_secret.clone(),
            config.notify_email.clone(),
        ));

        let app_state = AppState {
            config,
            settings_use_cases,
            pending_signup_use_cases,
            operator_use_cases,
            onboarding_use_cases,
            checkout_use_cases,
            signup_use_cases,
            notification_use_cases,
            stripe_webhook_use_cases,
        };

        (app_state, mocks)
    }
}

fn test_config(webhook_secret: Option<String>) -> AppConfig {
    AppConfig {
        database_url: "postgres://localhost/lawnies_test".to_string(),
        database_max_connections: 1,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        app_url: "http://localhost:3000".parse().unwrap(),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        app_env: "test".to_string(),
        stripe_mode: StripeMode::Test,
        settings_encryption_key: SecretString::from(TEST_SETTINGS_KEY.to_string()),
        stripe_secret_key: None,
        stripe_webhook_secret: webhook_secret.map(SecretString::from),
        stripe_prices: PriceDefaults {
            setup: Some("price_test_setup".to_string()),
            monthly: Some("price_test_monthly".to_string()),
            tax_rate: None,
        },
        admin_jwt_secret: SecretString::from(TEST_ADMIN_SECRET.to_string()),
        notify_email: DEFAULT_NOTIFY_EMAIL.to_string(),
        pending_signup_sweep_secs: 3600,
    }
}
