//! Hourly expiry sweeps for cooldowns and temporary bans.

use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::{
    services::{ban_service, cooldown_service},
    state::SharedState,
};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Run both expiry sweeps once.
///
/// Kept separate from the loop so startup and tests can trigger a pass
/// directly.
pub async fn sweep_once(state: &SharedState) {
    match cooldown_service::sweep(state).await {
        Ok(0) => {}
        Ok(expired) => info!(expired, "cooldowns swept"),
        Err(err) => debug!(error = %err, "cooldown sweep skipped"),
    }
    match ban_service::sweep(state).await {
        Ok(0) => {}
        Ok(lifted) => info!(lifted, "temporary bans swept"),
        Err(err) => debug!(error = %err, "ban sweep skipped"),
    }
}

/// Sweep expired cooldowns and temporary bans every hour, forever.
///
/// Sweeps are best effort; in degraded mode the lazy checks still guarantee
/// correctness and the next tick retries.
pub async fn run(state: SharedState) {
    let mut ticker = interval(SWEEP_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if state.is_degraded().await {
            warn!("skipping sweep while degraded");
            continue;
        }
        sweep_once(&state).await;
    }
}
