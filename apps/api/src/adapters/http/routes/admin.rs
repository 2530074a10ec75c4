use axum::{
    Extension, Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    adapters::http::{app_state::AppState, middleware::AdminContext},
    app_error::{AppError, AppResult},
    application::use_cases::settings::SettingsMap,
    domain::entities::setting::{SettingCategory, SettingWrite},
};

const FETCH_FAILED: &str = "Failed to fetch settings";
const SAVE_FAILED: &str = "Failed to save settings";

/// Returns the back-office router.
/// Note: `admin_auth` is applied in mod.rs when nesting this router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/settings/{category}", get(get_settings).put(put_settings))
        .route("/operators", get(list_operators))
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

type SettingsPayload = Map<String, Value>;

fn parse_category(raw: &str) -> AppResult<SettingCategory> {
    raw.parse::<SettingCategory>().map_err(|_| AppError::NotFound)
}

/// Submitted JSON value as a stored string. Objects and arrays (e.g. `form_sections`)
/// are kept as JSON text.
fn submitted_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Writes for an allow-listed category. Only keys present in the body are touched.
///
/// `stripe` also clears a value submitted as an empty string.
fn allow_listed_writes(
    category: SettingCategory,
    allowed: &[&str],
    payload: &SettingsPayload,
) -> Vec<(String, SettingWrite)> {
    allowed
        .iter()
        .filter_map(|key| {
            let submitted = submitted_string(payload.get(*key)?);
            let write = match category {
                SettingCategory::Stripe => SettingWrite::from_submitted_non_empty(submitted),
                _ => SettingWrite::from_submitted(submitted),
            };
            Some((key.to_string(), write))
        })
        .collect()
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/admin/settings/{category}
/// Encrypted values are masked in every category.
async fn get_settings(
    State(app_state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<impl IntoResponse> {
    let category = parse_category(&category)?;

    let settings = app_state
        .settings_use_cases
        .get_by_category_masked(category.as_str())
        .await
        .map_err(|e| e.with_public_message(FETCH_FAILED))?;

    Ok(Json(settings))
}

/// PUT /api/admin/settings/{category}
async fn put_settings(
    State(app_state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(category): Path<String>,
    payload: Result<Json<SettingsPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let category = parse_category(&category)?;
    let Json(payload) = payload.map_err(|_| AppError::InvalidInput("Invalid input".into()))?;
    let actor = Some(admin.subject.as_str());

    match category.editable_keys() {
        None => {
            let provider = payload
                .get("provider")
                .and_then(submitted_string)
                .filter(|p| !p.trim().is_empty());
            if provider.is_none() {
                return Err(AppError::InvalidInput("Email provider is required".into()));
            }

            let entries: SettingsMap = payload
                .iter()
                .filter_map(|(k, v)| submitted_string(v).map(|s| (k.clone(), s)))
                .collect();

            app_state
                .settings_use_cases
                .replace_email_settings(entries, actor)
                .await
                .map_err(|e| e.with_public_message(SAVE_FAILED))?;
        }
        Some(allowed) => {
            let writes = allow_listed_writes(category, allowed, &payload);
            app_state
                .settings_use_cases
                .set_bulk(category.as_str(), writes, actor)
                .await
                .map_err(|e| e.with_public_message(SAVE_FAILED))?;
        }
    }

    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/admin/operators
async fn list_operators(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let operators = app_state
        .operator_use_cases
        .list_all()
        .await
        .map_err(|e| e.with_public_message("Failed to fetch operators"))?;

    Ok(Json(operators))
}
