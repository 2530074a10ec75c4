use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::application::email_templates::{NewOperatorDetails, new_operator_email};
use crate::application::use_cases::notification::{NotificationUseCases, OutgoingEmail};
use crate::application::use_cases::operator::{NewOperator, OperatorProfile, OperatorUseCases};
use crate::application::use_cases::pending_signup::PendingSignupUseCases;
use crate::domain::entities::stripe_event::StripeEventKind;
use crate::infra::stripe_client::{StripeCheckoutSession, StripeWebhookEvent, verify_webhook_signature};

pub const PENDING_SIGNUP_METADATA_KEY: &str = "pending_signup_id";

/// What happened to a verified webhook delivery. Every variant is acknowledged with 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Ignored { event_type: String },
    AlreadyProvisioned { operator_id: Uuid },
    PendingSignupMissing,
    /// Insert was skipped by a unique constraint; the pending signup was removed.
    ProvisionConflict,
    Provisioned { operator_id: Uuid, notified: bool },
}

#[derive(Clone)]
pub struct StripeWebhookUseCases {
    operators: Arc<OperatorUseCases>,
    pending: Arc<PendingSignupUseCases>,
    notifications: Arc<NotificationUseCases>,
    webhook_secret: Option<SecretString>,
    notify_email: String,
}

impl StripeWebhookUseCases {
    pub fn new(
        operators: Arc<OperatorUseCases>,
        pending: Arc<PendingSignupUseCases>,
        notifications: Arc<NotificationUseCases>,
        webhook_secret: Option<SecretString>,
        notify_email: impl Into<String>,
    ) -> Self {
        Self {
            operators,
            pending,
            notifications,
            webhook_secret,
            notify_email: notify_email.into(),
        }
    }

    /// Verify and process one raw webhook delivery.
    pub async fn handle(&self, payload: &str, signature: Option<&str>) -> AppResult<WebhookOutcome> {
        let signature = signature.ok_or(AppError::MissingSignature)?;
        let secret = self
            .webhook_secret
            .as_ref()
            .filter(|s| !s.expose_secret().is_empty())
            .ok_or_else(|| AppError::Configuration("Stripe webhook secret not configured".into()))?;

        verify_webhook_signature(payload, signature, secret.expose_secret()).inspect_err(|err| {
            tracing::warn!(error = %err, "Stripe webhook signature verification failed");
        })?;

        let event: StripeWebhookEvent = serde_json::from_str(payload)
            .map_err(|e| AppError::InvalidInput(format!("Invalid webhook payload: {}", e)))?;

        match StripeEventKind::parse(&event.event_type) {
            StripeEventKind::CheckoutSessionCompleted => {
                let session = event.get_checkout_session().ok_or_else(|| {
                    AppError::InvalidInput("Invalid checkout session payload".into())
                })?;
                self.handle_checkout_completed(&event.id, session).await
            }
            StripeEventKind::Other(event_type) => {
                tracing::debug!(event_id = %event.id, event_type = %event_type, "Ignoring Stripe event");
                Ok(WebhookOutcome::Ignored { event_type })
            }
        }
    }

    async fn handle_checkout_completed(
        &self,
        event_id: &str,
        session: StripeCheckoutSession,
    ) -> AppResult<WebhookOutcome> {
        if let Some(existing) = self.operators.get_by_checkout_session(&session.id).await? {
            tracing::info!(
                event_id,
                checkout_session_id = %session.id,
                operator_id = %existing.id,
                "Checkout session already provisioned"
            );
            return Ok(WebhookOutcome::AlreadyProvisioned {
                operator_id: existing.id,
            });
        }

        let raw_pending_id = session
            .metadata
            .get(PENDING_SIGNUP_METADATA_KEY)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::InvalidInput("Missing pending_signup_id metadata".into()))?;

        let pending = match Uuid::parse_str(raw_pending_id) {
            Ok(id) => self.pending.get_by_id(id).await?,
            Err(_) => None,
        };
        let Some(pending) = pending else {
            tracing::warn!(
                event_id,
                checkout_session_id = %session.id,
                pending_signup_id = %raw_pending_id,
                "Pending signup not found or expired"
            );
            return Ok(WebhookOutcome::PendingSignupMissing);
        };

        let created = self
            .operators
            .create_if_absent(NewOperator {
                email: pending.email.clone(),
                password_hash: pending.password_hash.clone(),
                business_name: pending.business_name.clone(),
                phone: pending.phone.clone(),
                stripe_customer_id: session.customer.clone(),
                stripe_subscription_id: session.subscription.clone(),
                stripe_checkout_session_id: session.id.clone(),
            })
            .await?;

        let Some(operator) = created else {
            tracing::warn!(
                event_id,
                checkout_session_id = %session.id,
                pending_signup_id = %pending.id,
                "Operator insert skipped by unique constraint"
            );
            self.pending.delete(pending.id).await?;
            return Ok(WebhookOutcome::ProvisionConflict);
        };

        tracing::info!(
            event_id,
            checkout_session_id = %session.id,
            operator_id = %operator.id,
            "Operator provisioned"
        );

        let notified = self.notify_new_operator(&operator).await;
        self.pending.delete(pending.id).await?;

        Ok(WebhookOutcome::Provisioned {
            operator_id: operator.id,
            notified,
        })
    }

    /// Failures are logged by the dispatcher and never fail the webhook.
    async fn notify_new_operator(&self, operator: &OperatorProfile) -> bool {
        let content = new_operator_email(&NewOperatorDetails {
            business_name: &operator.business_name,
            email: &operator.email,
            phone: &operator.phone,
            signed_up_at: operator.created_at,
            stripe_customer_id: operator.stripe_customer_id.as_deref(),
            stripe_subscription_id: operator.stripe_subscription_id.as_deref(),
        });

        let email = OutgoingEmail {
            to: self.notify_email.clone(),
            subject: content.subject,
            html: content.html,
            text: content.text,
        };

        match self.notifications.send(&email).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    operator_id = %operator.id,
                    error = %err,
                    "New operator notification not delivered"
                );
                false
            }
        }
    }
}
