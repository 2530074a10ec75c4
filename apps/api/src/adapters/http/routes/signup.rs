use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
    routing::post,
};
use serde::Serialize;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::validators::SignupForm,
};

const SIGNUP_FAILED_MESSAGE: &str = "Internal server error. Please try again.";

pub fn router() -> Router<AppState> {
    Router::new().route("/create-checkout", post(create_checkout))
}

#[derive(Serialize)]
struct CreateCheckoutResponse {
    url: String,
}

/// POST /api/signup/create-checkout
/// Records a pending signup and returns the hosted checkout URL.
async fn create_checkout(
    State(app_state): State<AppState>,
    payload: Result<Json<SignupForm>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(form) = payload.map_err(|_| AppError::InvalidInput("Invalid input".into()))?;

    let url = app_state
        .signup_use_cases
        .start_checkout(form)
        .await
        .map_err(|e| e.with_public_message(SIGNUP_FAILED_MESSAGE))?;

    Ok(Json(CreateCheckoutResponse { url }))
}
