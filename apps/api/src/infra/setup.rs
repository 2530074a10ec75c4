use crate::{
    adapters::{http::app_state::AppState, persistence::PostgresPersistence},
    infra::{
        config::AppConfig, crypto::SettingsCipher, db::init_db, email_transport::ProviderEmailTransport,
        error::InfraError, stripe_client::StripeCheckoutGateway,
    },
    use_cases::{
        checkout::CheckoutUseCases, notification::NotificationUseCases, onboarding::OnboardingUseCases,
        operator::OperatorUseCases, pending_signup::PendingSignupUseCases, settings::SettingsUseCases,
        signup::SignupUseCases, stripe_webhook::StripeWebhookUseCases,
    },
};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Builds the application state. The pool is returned for startup tasks such as migrations.
pub async fn init_app_state() -> anyhow::Result<(AppState, PgPool)> {
    init_tracing();

    let config = AppConfig::from_env();

    let cipher = Arc::new(
        SettingsCipher::from_hex(config.settings_encryption_key.expose_secret())
            .map_err(InfraError::CipherInit)?,
    );
    let pool = init_db(&config.database_url, config.database_max_connections).await?;
    let postgres_arc = Arc::new(PostgresPersistence::new(pool));

    let settings_use_cases = Arc::new(SettingsUseCases::new(postgres_arc.clone(), cipher));
    let pending_signup_use_cases = Arc::new(PendingSignupUseCases::new(postgres_arc.clone()));
    let operator_use_cases = Arc::new(OperatorUseCases::new(postgres_arc.clone()));
    let onboarding_use_cases = Arc::new(OnboardingUseCases::new(
        postgres_arc.clone(),
        operator_use_cases.clone(),
        settings_use_cases.clone(),
    ));

    let gateway = Arc::new(StripeCheckoutGateway::new(config.stripe_secret_key.clone()));
    let checkout_use_cases = Arc::new(CheckoutUseCases::new(
        settings_use_cases.clone(),
        gateway,
        config.stripe_prices.clone(),
        config.app_url.as_str(),
    ));
    let signup_use_cases = Arc::new(SignupUseCases::new(
        pending_signup_use_cases.clone(),
        operator_use_cases.clone(),
        checkout_use_cases.clone(),
    ));

    let notification_use_cases = Arc::new(NotificationUseCases::new(
        settings_use_cases.clone(),
        Arc::new(ProviderEmailTransport::new()),
    ));
    let stripe_webhook_use_cases = Arc::new(StripeWebhookUseCases::new(
        operator_use_cases.clone(),
        pending_signup_use_cases.clone(),
        notification_use_cases.clone(),
        config.stripe_webhook_secret.clone(),
        config.notify_email.clone(),
    ));

    tracing::info!(
        app_env = %config.app_env,
        stripe_mode = %config.stripe_mode,
        stripe_configured = config.stripe_secret_key.is_some(),
        webhook_configured = config.stripe_webhook_secret.is_some(),
        "Application state initialized"
    );

    let app_state = AppState {
        config: Arc::new(config),
        settings_use_cases,
        pending_signup_use_cases,
        operator_use_cases,
        onboarding_use_cases,
        checkout_use_cases,
        signup_use_cases,
        notification_use_cases,
        stripe_webhook_use_cases,
    };

    Ok((app_state, postgres_arc.pool().clone()))
}

/// JSON lines on stdout in production, pretty console output elsewhere.
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let production = std::env::var("APP_ENV").is_ok_and(|env| env == "production");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if production {
            "lawnies_api=info,tower_http=info".into()
        } else {
            "lawnies_api=debug,tower_http=debug".into()
        }
    });

    let registry = tracing_subscriber::registry().with(filter);

    let result = if production {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_level(true).pretty())
            .try_init()
    };
    result.ok();
}
