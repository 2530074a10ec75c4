use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{error, info};

use crate::use_cases::pending_signup::PendingSignupUseCases;

const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Periodically deletes pending signups whose 24h window has passed.
pub async fn run_pending_signup_sweep_loop(pending: Arc<PendingSignupUseCases>, period: Duration) {
    let period = period.max(MIN_PERIOD);
    let mut ticker = interval(period);

    info!(
        "Pending signup sweeper started (every {}s)",
        period.as_secs()
    );

    loop {
        ticker.tick().await;

        if let Err(e) = pending.sweep_expired().await {
            error!(error = ?e, "Failed to sweep expired pending signups");
        }
    }
}
