use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::app_error::{AppError, AppResult};
use crate::application::ports::checkout_gateway::{CheckoutGateway, CheckoutRequest, CheckoutSession};
use crate::infra::http_client;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Accepted clock skew between Stripe's signature timestamp and ours.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: SecretString,
}

impl StripeClient {
    pub fn new(secret_key: SecretString) -> Self {
        Self {
            client: http_client::build_client(),
            secret_key,
        }
    }

    fn auth_header(&self) -> String {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:", self.secret_key.expose_secret()));
        format!("Basic {}", encoded)
    }

    // ========================================================================
    // Checkout Sessions
    // ========================================================================

    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> AppResult<StripeCheckoutSession> {
        let response = self
            .client
            .post(format!("{}/checkout/sessions", STRIPE_API_BASE))
            .header("Authorization", self.auth_header())
            .form(&checkout_session_params(request))
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Stripe request failed: {}", e)))?;

        self.handle_response(response).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read Stripe response: {}", e)))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Stripe API error");

            if let Ok(error) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(AppError::Internal(format!(
                    "Stripe error: {}",
                    error.error.message.unwrap_or(error.error.error_type)
                )));
            }

            return Err(AppError::Internal(format!(
                "Stripe API error: {} - {}",
                status, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(body = %body, error = %e, "Failed to parse Stripe response");
            AppError::Internal(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

/// Form-encoded body for `POST /v1/checkout/sessions`.
fn checkout_session_params(request: &CheckoutRequest) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = vec![
        ("mode".to_string(), "subscription".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("customer_email".to_string(), request.customer_email.clone()),
        (
            "metadata[pending_signup_id]".to_string(),
            request.pending_signup_id.to_string(),
        ),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];

    for (i, item) in request.line_items.iter().enumerate() {
        params.push((format!("line_items[{i}][price]"), item.price_id.clone()));
        params.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        if let Some(tax_rate) = &item.tax_rate_id {
            params.push((format!("line_items[{i}][tax_rates][0]"), tax_rate.clone()));
        }
    }

    params
}

// ============================================================================
// Lazy gateway
// ============================================================================

/// [`CheckoutGateway`] backed by Stripe. The HTTP client is built on first use
/// so the process starts without Stripe credentials; calls then fail with a
/// configuration error instead.
pub struct StripeCheckoutGateway {
    secret_key: Option<SecretString>,
    client: OnceCell<StripeClient>,
}

impl StripeCheckoutGateway {
    pub fn new(secret_key: Option<SecretString>) -> Self {
        Self {
            secret_key,
            client: OnceCell::new(),
        }
    }

    pub fn client(&self) -> AppResult<&StripeClient> {
        self.client.get_or_try_init(|| {
            let key = self
                .secret_key
                .as_ref()
                .filter(|k| !k.expose_secret().is_empty())
                .ok_or_else(|| AppError::Configuration("Stripe secret key not configured".into()))?;
            Ok(StripeClient::new(key.clone()))
        })
    }
}

#[async_trait]
impl CheckoutGateway for StripeCheckoutGateway {
    async fn create_subscription_checkout(&self, request: &CheckoutRequest) -> AppResult<CheckoutSession> {
        let session = self.client()?.create_checkout_session(request).await?;
        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
        })
    }
}

// ============================================================================
// Webhook Signature Verification
// ============================================================================

/// Verify a `stripe-signature` header (`t=<ts>,v1=<hex>[,v1=...]`) against the raw body.
pub fn verify_webhook_signature(
    payload: &str,
    signature_header: &str,
    webhook_secret: &str,
) -> AppResult<()> {
    verify_webhook_signature_at(
        payload,
        signature_header,
        webhook_secret,
        chrono::Utc::now().timestamp(),
    )
}

pub fn verify_webhook_signature_at(
    payload: &str,
    signature_header: &str,
    webhook_secret: &str,
    now: i64,
) -> AppResult<()> {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in signature_header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = Some(value),
            "v1" => signatures.push(value),
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| AppError::InvalidSignature("missing timestamp".into()))?;

    if signatures.is_empty() {
        return Err(AppError::InvalidSignature("missing v1 signature".into()));
    }

    let signed_payload = format!("{}.{}", timestamp, payload);
    let mut mac = Hmac::<Sha256>::new_from_slice(webhook_secret.as_bytes())
        .map_err(|_| AppError::Internal("HMAC error".into()))?;
    mac.update(signed_payload.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    if !signatures.iter().any(|sig| constant_time_compare(sig, &expected)) {
        return Err(AppError::InvalidSignature("signature mismatch".into()));
    }

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| AppError::InvalidSignature("invalid timestamp".into()))?;
    if (now - ts).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(AppError::InvalidSignature("timestamp outside tolerance".into()));
    }

    Ok(())
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

// ============================================================================
// Stripe Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,
    pub url: Option<String>,
    pub customer: Option<String>,
    pub subscription: Option<String>,
    #[serde(default)]
    pub metadata: std::collections::HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeError,
}

#[derive(Debug, Deserialize)]
pub struct StripeError {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StripeWebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeWebhookEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeWebhookEventData {
    pub object: serde_json::Value,
}

impl StripeWebhookEvent {
    pub fn get_checkout_session(&self) -> Option<StripeCheckoutSession> {
        serde_json::from_value(self.data.object.clone()).ok()
    }
}
