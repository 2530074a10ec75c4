use async_trait::async_trait;
use uuid::Uuid;

use crate::app_error::AppResult;

// ============================================================================
// Port Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLineItem {
    pub price_id: String,
    pub quantity: u32,
    pub tax_rate_id: Option<String>,
}

/// Everything the payment provider needs to open a hosted subscription checkout.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub customer_email: String,
    /// Echoed back in the completion webhook as `metadata.pending_signup_id`.
    pub pending_signup_id: Uuid,
    pub line_items: Vec<CheckoutLineItem>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

// ============================================================================
// Port Trait
// ============================================================================

#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_subscription_checkout(&self, request: &CheckoutRequest) -> AppResult<CheckoutSession>;
}
