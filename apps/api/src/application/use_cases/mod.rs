pub mod checkout;
pub mod notification;
pub mod onboarding;
pub mod operator;
pub mod pending_signup;
pub mod settings;
pub mod signup;
pub mod stripe_webhook;
