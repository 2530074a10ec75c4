use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/welcome/config", get(get_welcome_config))
        .route("/welcome/survey", post(submit_survey))
        .route("/complete/config", get(get_complete_config))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
struct WelcomeConfigQuery {
    session_id: Option<String>,
}

#[derive(Deserialize)]
struct SurveyPayload {
    session_id: Option<String>,
    responses: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/welcome/config?session_id=
async fn get_welcome_config(
    State(app_state): State<AppState>,
    Query(query): Query<WelcomeConfigQuery>,
) -> AppResult<impl IntoResponse> {
    let config = app_state
        .onboarding_use_cases
        .welcome_config(query.session_id.as_deref())
        .await
        .map_err(|e| e.with_public_message("Failed to load welcome config"))?;

    Ok(Json(config))
}

/// POST /api/welcome/survey
async fn submit_survey(
    State(app_state): State<AppState>,
    payload: Result<Json<SurveyPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(payload) = payload.map_err(|_| AppError::InvalidInput("Invalid input".into()))?;

    app_state
        .onboarding_use_cases
        .submit_survey(payload.session_id.as_deref(), payload.responses)
        .await
        .map_err(|e| e.with_public_message("Failed to save survey responses"))?;

    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/complete/config
async fn get_complete_config(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let config = app_state
        .onboarding_use_cases
        .complete_config()
        .await
        .map_err(|e| e.with_public_message("Failed to load complete config"))?;

    Ok(Json(config))
}
