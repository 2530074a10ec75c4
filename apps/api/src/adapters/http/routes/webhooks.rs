use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
};
use serde::Serialize;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}

#[derive(Serialize)]
struct WebhookAck {
    received: bool,
}

/// POST /api/webhooks/stripe
/// Raw body is required for signature verification. Processing failures
/// return 500 so Stripe retries the delivery.
async fn handle_stripe_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> AppResult<impl IntoResponse> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok());

    let outcome = app_state
        .stripe_webhook_use_cases
        .handle(&body, signature)
        .await
        .map_err(|e| match e {
            AppError::Configuration(_) => e.with_public_message("Webhook not configured"),
            other => other,
        })?;

    tracing::debug!(outcome = ?outcome, "Stripe webhook processed");

    Ok(Json(WebhookAck { received: true }))
}
