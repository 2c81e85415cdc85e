//! Abstraction over the external score ledger (the hosted profile store).

use std::error::Error;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error raised by ledger backends regardless of the underlying transport.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger could not be reached or answered with a transport error.
    #[error("score ledger unavailable: {message}")]
    Unavailable {
        /// Human readable description of the failure.
        message: String,
        /// Underlying transport error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The ledger refused the operation (bad request, unknown account, ...).
    #[error("score ledger rejected the operation: {0}")]
    Rejected(String),
}

impl LedgerError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        LedgerError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}

/// Player profile as stored by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Stable account identifier.
    pub user_id: String,
    /// Display name chosen by the player.
    pub display_name: String,
    /// Current ranked score; never negative.
    pub score: i64,
}

/// Interface to the external profile store that owns player scores.
///
/// Implementations must clamp scores at a lower bound of zero when applying
/// deltas; the coordinator relies on that invariant instead of re-checking.
pub trait ScoreLedger: Send + Sync {
    /// Fetch a player's profile, if the account exists.
    fn fetch(&self, user_id: &str) -> BoxFuture<'static, LedgerResult<Option<PlayerProfile>>>;
    /// Apply a score delta and return the updated profile.
    fn apply_delta(&self, user_id: &str, delta: i64)
    -> BoxFuture<'static, LedgerResult<PlayerProfile>>;
    /// Cheap reachability probe used by the health endpoint and supervisor.
    fn health_check(&self) -> BoxFuture<'static, LedgerResult<()>>;
}
