use std::sync::Arc;

use crate::app_error::{AppError, AppResult};
use crate::application::use_cases::checkout::CheckoutUseCases;
use crate::application::use_cases::operator::OperatorUseCases;
use crate::application::use_cases::pending_signup::PendingSignupUseCases;
use crate::application::validators::{SignupForm, validate_signup};
use crate::infra::password::hash_password_blocking;

pub const ACCOUNT_EXISTS_MESSAGE: &str = "An account with this email already exists.";

/// Turns a submitted signup form into a hosted checkout URL.
#[derive(Clone)]
pub struct SignupUseCases {
    pending: Arc<PendingSignupUseCases>,
    operators: Arc<OperatorUseCases>,
    checkout: Arc<CheckoutUseCases>,
}

impl SignupUseCases {
    pub fn new(
        pending: Arc<PendingSignupUseCases>,
        operators: Arc<OperatorUseCases>,
        checkout: Arc<CheckoutUseCases>,
    ) -> Self {
        Self {
            pending,
            operators,
            checkout,
        }
    }

    pub async fn start_checkout(&self, form: SignupForm) -> AppResult<String> {
        validate_signup(&form).map_err(|msg| AppError::InvalidInput(msg.into()))?;

        if self.operators.get_by_email(&form.email).await?.is_some() {
            return Err(AppError::Conflict(ACCOUNT_EXISTS_MESSAGE.into()));
        }

        let password_hash = hash_password_blocking(form.password).await?;
        let pending = self
            .pending
            .create(
                &form.email,
                &password_hash,
                form.business_name.trim(),
                form.phone.trim(),
            )
            .await?;

        let session = self
            .checkout
            .create_checkout_session(&pending.email, pending.id)
            .await?;

        self.pending
            .attach_checkout_session(pending.id, &session.id)
            .await?
            .ok_or_else(|| AppError::Internal("Pending signup vanished before checkout".into()))?;

        session
            .url
            .ok_or_else(|| AppError::Internal("Checkout session has no redirect URL".into()))
    }
}
