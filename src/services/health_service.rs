use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with a static health payload while logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_ledger().await {
        Ok(ledger) => {
            if let Err(err) = ledger.health_check().await {
                warn!(error = %err, "score ledger health check failed");
            }
        }
        Err(_) => warn!("score ledger unavailable (degraded mode)"),
    }

    if state.is_degraded().await {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}
