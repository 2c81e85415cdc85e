//! Shared application state: the coordinator registries and the ledger slot.

pub mod outcome;
pub mod queue;
pub mod room;
pub mod session;

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, watch};

use crate::{
    config::AppConfig,
    dao::ledger::ScoreLedger,
    error::ServiceError,
    state::{outcome::OutcomeBoard, queue::MatchQueue, room::RoomRegistry, session::SessionRegistry},
};

/// Shared handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state owning the coordinator registries and the
/// handle to the external score ledger.
///
/// Each registry sits behind its own coarse mutex; an operation that needs
/// several of them must acquire the guards in this fixed order and hold them
/// for the whole read-modify-write unit:
///
/// sessions -> queue -> rooms -> outcomes
pub struct AppState {
    config: AppConfig,
    ledger: RwLock<Option<Arc<dyn ScoreLedger>>>,
    degraded: watch::Sender<bool>,
    sessions: Mutex<SessionRegistry>,
    queue: Mutex<MatchQueue>,
    rooms: Mutex<RoomRegistry>,
    outcomes: Mutex<OutcomeBoard>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a ledger is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            ledger: RwLock::new(None),
            degraded: degraded_tx,
            sessions: Mutex::new(SessionRegistry::new()),
            queue: Mutex::new(MatchQueue::new()),
            rooms: Mutex::new(RoomRegistry::new()),
            outcomes: Mutex::new(OutcomeBoard::new()),
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current ledger, if one is installed.
    pub async fn ledger(&self) -> Option<Arc<dyn ScoreLedger>> {
        let guard = self.ledger.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the ledger or fail with a degraded-mode error.
    pub async fn require_ledger(&self) -> Result<Arc<dyn ScoreLedger>, ServiceError> {
        self.ledger().await.ok_or(ServiceError::Degraded)
    }

    /// Install a ledger implementation and leave degraded mode.
    pub async fn install_ledger(&self, ledger: Arc<dyn ScoreLedger>) {
        {
            let mut guard = self.ledger.write().await;
            *guard = Some(ledger);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current ledger and enter degraded mode.
    pub async fn clear_ledger(&self) {
        {
            let mut guard = self.ledger.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    ///
    /// Tracks the broadcast value rather than ledger presence, so a probe
    /// failure can degrade the state while the ledger handle stays
    /// installed.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Session registry lock. First in the acquisition order.
    pub fn sessions(&self) -> &Mutex<SessionRegistry> {
        &self.sessions
    }

    /// Matchmaking queue lock. Second in the acquisition order.
    pub fn queue(&self) -> &Mutex<MatchQueue> {
        &self.queue
    }

    /// Room registry lock. Third in the acquisition order.
    pub fn rooms(&self) -> &Mutex<RoomRegistry> {
        &self.rooms
    }

    /// Pending outcome lock. Last in the acquisition order.
    pub fn outcomes(&self) -> &Mutex<OutcomeBoard> {
        &self.outcomes
    }
}
