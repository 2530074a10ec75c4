use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

use crate::application::use_cases::checkout::PriceDefaults;
use crate::domain::entities::stripe_mode::StripeMode;

pub const DEFAULT_NOTIFY_EMAIL: &str = "systems@automator.au";
pub const DEFAULT_SWEEP_SECS: u64 = 3600;

/// A zero period would panic `tokio::time::interval`, so it falls back to the default.
fn sweep_period_secs(configured: u64) -> u64 {
    if configured == 0 {
        tracing::warn!(
            "PENDING_SIGNUP_SWEEP_SECS must be positive, using {}s",
            DEFAULT_SWEEP_SECS
        );
        DEFAULT_SWEEP_SECS
    } else {
        configured
    }
}

pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    /// Public frontend origin used for checkout redirect URLs.
    pub app_url: Url,
    pub cors_origin: HeaderValue,
    pub app_env: String,
    pub stripe_mode: StripeMode,
    /// 64 hex chars (32 bytes) for AES-256-GCM settings encryption.
    pub settings_encryption_key: SecretString,
    /// Secret key for the active Stripe mode. Absent keys fail checkout lazily.
    pub stripe_secret_key: Option<SecretString>,
    pub stripe_webhook_secret: Option<SecretString>,
    /// Env fallbacks for the `stripe` settings category.
    pub stripe_prices: PriceDefaults,
    pub admin_jwt_secret: SecretString,
    pub notify_email: String,
    pub pending_signup_sweep_secs: u64,
}

/// Unset and blank variables both read as `None`.
fn optional_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url: String = get_env("DATABASE_URL");
        let database_max_connections: u32 = get_env_default("DATABASE_MAX_CONNECTIONS", 10);
        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let app_url: Url = get_env_default("APP_URL", "http://localhost:3000".parse().unwrap());
        let cors_origin: HeaderValue = get_env_default(
            "CORS_ORIGIN",
            app_url.origin().ascii_serialization(),
        )
        .parse()
        .expect("CORS_ORIGIN must be a valid header value");

        let app_env: String = get_env_default("APP_ENV", "development".to_string());
        let stripe_mode = StripeMode::from_app_env(&app_env);
        let suffix = stripe_mode.env_suffix();

        let stripe_secret_key = optional_env(&format!("STRIPE_SECRET_KEY_{suffix}"));
        if let Some(key) = &stripe_secret_key
            && let Err(e) = stripe_mode.validate_key_prefix(key, &format!("STRIPE_SECRET_KEY_{suffix}"))
        {
            tracing::warn!(error = %e, mode = %stripe_mode, "Stripe secret key does not match mode");
        }

        let stripe_prices = PriceDefaults {
            setup: optional_env(&format!("STRIPE_PRICE_SETUP_{suffix}")),
            monthly: optional_env(&format!("STRIPE_PRICE_MONTHLY_{suffix}")),
            tax_rate: optional_env(&format!("STRIPE_TAX_RATE_{suffix}")),
        };

        Self {
            database_url,
            database_max_connections,
            bind_addr,
            app_url,
            cors_origin,
            app_env,
            stripe_mode,
            settings_encryption_key: SecretString::from(get_env::<String>("SETTINGS_ENCRYPTION_KEY")),
            stripe_secret_key: stripe_secret_key.map(SecretString::from),
            stripe_webhook_secret: optional_env(&format!("STRIPE_WEBHOOK_SECRET_{suffix}"))
                .map(SecretString::from),
            stripe_prices,
            admin_jwt_secret: SecretString::from(get_env::<String>("ADMIN_JWT_SECRET")),
            notify_email: get_env_default("NOTIFY_EMAIL", DEFAULT_NOTIFY_EMAIL.to_string()),
            pending_signup_sweep_secs: sweep_period_secs(get_env_default(
                "PENDING_SIGNUP_SWEEP_SECS",
                DEFAULT_SWEEP_SECS,
            )),
        }
    }
}
