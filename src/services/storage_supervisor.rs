//! Keeps the storage backend connected and the shared state's degraded flag
//! honest.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{storage::StorageError, tier_store::TierStore},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Connect to storage, hydrate the live document once, then watch backend
/// health forever, entering degraded mode while it is unreachable.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn TierStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        let store = match connect().await {
            Ok(store) => store,
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
                continue;
            }
        };

        let snapshot = match store.load().await {
            Ok(snapshot) => snapshot.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "stored document could not be loaded");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
                continue;
            }
        };

        state.install_store(store.clone(), snapshot).await;
        info!("storage connection established; leaving degraded mode");
        delay = INITIAL_DELAY;

        watch_health(&state, store).await;

        sleep(delay).await;
        delay = (delay * 2).min(MAX_DELAY);
    }
}

/// Poll the store until its health cannot be restored, toggling the degraded
/// flag along the way. Returns when reconnect attempts are exhausted.
async fn watch_health(state: &SharedState, store: Arc<dyn TierStore>) {
    loop {
        if store.health_check().await.is_ok() {
            if state.is_degraded().await {
                info!("storage healthy again; leaving degraded mode");
                state.update_degraded(false).await;
            }
            sleep(HEALTH_POLL_INTERVAL).await;
            continue;
        }

        let mut reconnect_delay = INITIAL_DELAY;
        let mut reconnected = false;
        for attempt in 0..MAX_RECONNECT_ATTEMPTS {
            match store.try_reconnect().await {
                Ok(()) => {
                    info!("storage reconnection succeeded after health check failure");
                    reconnected = true;
                    break;
                }
                Err(err) => {
                    if attempt == 0 {
                        warn!(attempt, error = %err, "storage reconnect failed; entering degraded mode");
                        state.update_degraded(true).await;
                    } else {
                        warn!(attempt, error = %err, "storage reconnect attempt failed");
                    }
                    sleep(reconnect_delay).await;
                    reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
                }
            }
        }

        if reconnected {
            state.update_degraded(false).await;
            sleep(HEALTH_POLL_INTERVAL).await;
        } else {
            warn!("exhausted storage reconnect attempts; staying in degraded mode");
            return;
        }
    }
}
