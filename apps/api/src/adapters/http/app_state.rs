use std::sync::Arc;

use crate::{
    application::use_cases::{
        checkout::CheckoutUseCases, notification::NotificationUseCases,
        onboarding::OnboardingUseCases, operator::OperatorUseCases,
        pending_signup::PendingSignupUseCases, settings::SettingsUseCases, signup::SignupUseCases,
        stripe_webhook::StripeWebhookUseCases,
    },
    infra::config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub settings_use_cases: Arc<SettingsUseCases>,
    pub pending_signup_use_cases: Arc<PendingSignupUseCases>,
    pub operator_use_cases: Arc<OperatorUseCases>,
    pub onboarding_use_cases: Arc<OnboardingUseCases>,
    pub checkout_use_cases: Arc<CheckoutUseCases>,
    pub signup_use_cases: Arc<SignupUseCases>,
    pub notification_use_cases: Arc<NotificationUseCases>,
    pub stripe_webhook_use_cases: Arc<StripeWebhookUseCases>,
}
