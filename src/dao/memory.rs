//! In-process score ledger used by tests and by deployments without a
//! configured remote ledger.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use futures::future::BoxFuture;

use crate::dao::ledger::{LedgerResult, PlayerProfile, ScoreLedger};

/// Score ledger keeping profiles in a process-local map.
///
/// Accounts are created on first delta so the coordinator never has to
/// pre-register players. Always reachable.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    profiles: Arc<Mutex<HashMap<String, PlayerProfile>>>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile, mostly useful in tests.
    pub fn insert(&self, profile: PlayerProfile) {
        let mut profiles = self
            .profiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        profiles.insert(profile.user_id.clone(), profile);
    }
}

impl ScoreLedger for InMemoryLedger {
    fn fetch(&self, user_id: &str) -> BoxFuture<'static, LedgerResult<Option<PlayerProfile>>> {
        let profiles = Arc::clone(&self.profiles);
        let user_id = user_id.to_owned();
        Box::pin(async move {
            let profiles = profiles.lock().unwrap_or_else(PoisonError::into_inner);
            Ok(profiles.get(&user_id).cloned())
        })
    }

    fn apply_delta(
        &self,
        user_id: &str,
        delta: i64,
    ) -> BoxFuture<'static, LedgerResult<PlayerProfile>> {
        let profiles = Arc::clone(&self.profiles);
        let user_id = user_id.to_owned();
        Box::pin(async move {
            let mut profiles = profiles.lock().unwrap_or_else(PoisonError::into_inner);
            let profile = profiles
                .entry(user_id.clone())
                .or_insert_with(|| PlayerProfile {
                    user_id: user_id.clone(),
                    display_name: user_id.clone(),
                    score: 0,
                });
            profile.score = (profile.score + delta).max(0);
            Ok(profile.clone())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, LedgerResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delta_is_clamped_at_zero() {
        let ledger = InMemoryLedger::new();
        ledger.insert(PlayerProfile {
            user_id: "ada".into(),
            display_name: "Ada".into(),
            score: 3,
        });

        let profile = ledger.apply_delta("ada", -10).await.unwrap();
        assert_eq!(profile.score, 0);
    }

    #[tokio::test]
    async fn delta_creates_missing_account() {
        let ledger = InMemoryLedger::new();
        let profile = ledger.apply_delta("ghost", 7).await.unwrap();
        assert_eq!(profile.score, 7);
        assert!(ledger.fetch("ghost").await.unwrap().is_some());
    }
}
