use dotenvy::dotenv;
use tracing::info;

use lawnies_api::infra::{
    app::create_app, db::run_migrations, pending_signup_sweeper::run_pending_signup_sweep_loop,
    setup::init_app_state,
};
use std::net::SocketAddr;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let (app_state, pool) = init_app_state().await?;

    run_migrations(&pool).await?;

    let bind_addr = app_state.config.bind_addr;

    let app = create_app(app_state.clone());

    // Spawn expired pending signup sweeper (after tracing is initialized)
    let pending_signup_use_cases = app_state.pending_signup_use_cases.clone();
    let sweep_every = Duration::from_secs(app_state.config.pending_signup_sweep_secs);
    tokio::spawn(async move {
        run_pending_signup_sweep_loop(pending_signup_use_cases, sweep_every).await;
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Backend listening at {}", &listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
