use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{adapters::http::app_state::AppState, app_error::AppError, application::jwt};

/// Authenticated back-office caller, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub subject: String,
}

/// Requires `Authorization: Bearer <jwt>` with the `super_admin` role.
pub async fn admin_auth(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or(AppError::Unauthorized)?;
    let claims = jwt::verify_admin(token, &app_state.config.admin_jwt_secret)?;

    if !claims.is_super_admin() {
        tracing::warn!(subject = %claims.sub, role = %claims.role, "Admin route denied for role");
        return Err(AppError::Unauthorized);
    }

    request.extensions_mut().insert(AdminContext { subject: claims.sub });

    Ok(next.run(request).await)
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
