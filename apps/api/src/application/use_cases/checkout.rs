use std::sync::Arc;

use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::application::ports::checkout_gateway::{
    CheckoutGateway, CheckoutLineItem, CheckoutRequest, CheckoutSession,
};
use crate::application::use_cases::settings::SettingsUseCases;
use crate::domain::entities::setting::SettingCategory;

/// Price ids used when the `stripe` settings category does not override them.
#[derive(Debug, Clone, Default)]
pub struct PriceDefaults {
    pub setup: Option<String>,
    pub monthly: Option<String>,
    pub tax_rate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrices {
    pub setup: String,
    pub monthly: String,
    pub tax_rate: Option<String>,
}

#[derive(Clone)]
pub struct CheckoutUseCases {
    settings: Arc<SettingsUseCases>,
    gateway: Arc<dyn CheckoutGateway>,
    defaults: PriceDefaults,
    app_url: String,
}

impl CheckoutUseCases {
    pub fn new(
        settings: Arc<SettingsUseCases>,
        gateway: Arc<dyn CheckoutGateway>,
        defaults: PriceDefaults,
        app_url: impl Into<String>,
    ) -> Self {
        Self {
            settings,
            gateway,
            defaults,
            app_url: app_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Settings take precedence over the environment defaults for the active mode.
    pub async fn resolve_prices(&self) -> AppResult<ResolvedPrices> {
        let stripe = self
            .settings
            .get_by_category(SettingCategory::Stripe.as_str())
            .await?;
        let pick = |key: &str, fallback: &Option<String>| {
            stripe
                .get(key)
                .filter(|v| !v.trim().is_empty())
                .cloned()
                .or_else(|| fallback.clone().filter(|v| !v.trim().is_empty()))
        };

        let (Some(setup), Some(monthly)) = (
            pick("price_setup", &self.defaults.setup),
            pick("price_monthly", &self.defaults.monthly),
        ) else {
            return Err(AppError::Configuration(
                "Stripe price IDs not configured (price_setup / price_monthly)".into(),
            ));
        };

        Ok(ResolvedPrices {
            setup,
            monthly,
            tax_rate: pick("tax_rate", &self.defaults.tax_rate),
        })
    }

    pub async fn create_checkout_session(
        &self,
        email: &str,
        pending_signup_id: Uuid,
    ) -> AppResult<CheckoutSession> {
        let prices = self.resolve_prices().await?;
        let line_item = |price_id: String| CheckoutLineItem {
            price_id,
            quantity: 1,
            tax_rate_id: prices.tax_rate.clone(),
        };

        let request = CheckoutRequest {
            customer_email: email.to_string(),
            pending_signup_id,
            line_items: vec![line_item(prices.setup.clone()), line_item(prices.monthly.clone())],
            success_url: format!("{}/welcome?session_id={{CHECKOUT_SESSION_ID}}", self.app_url),
            cancel_url: format!("{}/signup", self.app_url),
        };

        let session = self.gateway.create_subscription_checkout(&request).await?;
        tracing::info!(
            checkout_session_id = %session.id,
            pending_signup_id = %pending_signup_id,
            "Checkout session created"
        );
        Ok(session)
    }
}
