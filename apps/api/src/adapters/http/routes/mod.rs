pub mod admin;
pub mod public;
pub mod signup;
pub mod webhooks;

use axum::{Router, middleware};

use crate::adapters::http::{app_state::AppState, middleware::admin_auth};

pub fn router(app_state: AppState) -> Router<AppState> {
    Router::new()
        .merge(public::router())
        .nest("/signup", signup::router())
        .nest("/webhooks", webhooks::router())
        .nest(
            "/admin",
            admin::router().layer(middleware::from_fn_with_state(app_state, admin_auth)),
        )
}
