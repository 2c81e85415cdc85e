//! Keeps the score ledger attached to the shared state and toggles degraded
//! mode based on periodic probes.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::ledger::{LedgerError, ScoreLedger},
    state::SharedState,
};

/// How often a connected ledger is probed.
const PROBE_INTERVAL: Duration = Duration::from_secs(5);
/// Backoff bounds while waiting for the first successful connection.
const RETRY_FLOOR: Duration = Duration::from_secs(1);
const RETRY_CEILING: Duration = Duration::from_secs(30);

/// Attach the ledger produced by `connect`, then probe it forever.
///
/// The ledger speaks plain HTTP, so there is no connection to rebuild after
/// a failure: a failed probe flips the shared state to degraded and the
/// next successful probe lifts it again, while score writes in between
/// surface their own errors through the reconciler. Only the initial
/// connection is retried, with capped exponential backoff.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn ScoreLedger>, LedgerError>> + Send,
{
    let mut retry = RETRY_FLOOR;
    let ledger = loop {
        match connect().await {
            Ok(ledger) => break ledger,
            Err(err) => {
                warn!(error = %err, retry_in = ?retry, "score ledger unreachable");
                sleep(retry).await;
                retry = (retry * 2).min(RETRY_CEILING);
            }
        }
    };

    info!("score ledger attached; leaving degraded mode");
    state.install_ledger(ledger.clone()).await;

    loop {
        sleep(PROBE_INTERVAL).await;
        match ledger.health_check().await {
            Ok(()) => {
                if state.is_degraded().await {
                    info!("score ledger answering again; leaving degraded mode");
                    state.update_degraded(false).await;
                }
            }
            Err(err) => {
                if !state.is_degraded().await {
                    warn!(error = %err, "score ledger stopped answering; entering degraded mode");
                    state.update_degraded(true).await;
                }
            }
        }
    }
}
