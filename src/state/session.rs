//! Session registry: the single source of truth for which two users are
//! currently dueling, shared by queue-originated and room-originated duels.

use std::{
    collections::HashMap,
    time::{Instant, SystemTime},
};

use uuid::Uuid;

/// Minimal identity carried for each player throughout the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRef {
    /// Stable account identifier.
    pub user_id: String,
    /// Display name shown to the opponent.
    pub display_name: String,
}

/// Matchmaking partition a duel belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuelMode {
    /// Outcome affects the ranked score ledger.
    Ranked,
    /// Friendly match; never mutates scores.
    Casual,
}

/// Which subsystem created a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrigin {
    /// Paired through the public matchmaking queue.
    Queue,
    /// Derived from a private code-addressed room.
    PrivateRoom,
}

/// An active duel between exactly two players.
///
/// Immutable once registered, except for deletion.
#[derive(Debug, Clone)]
pub struct DuelSession {
    /// Unique session identifier.
    pub id: Uuid,
    /// Matchmaking partition the duel belongs to.
    pub mode: DuelMode,
    /// The two participants, in pairing order.
    pub participants: [PlayerRef; 2],
    /// Opaque handle of the external video channel both clients join.
    pub channel_id: String,
    /// Which subsystem created the session.
    pub origin: SessionOrigin,
    /// Wall-clock creation time, for display purposes.
    pub created_at: SystemTime,
    /// Monotonic creation time, used for duel duration accounting.
    pub started_at: Instant,
}

impl DuelSession {
    /// The participant that is not `user_id`, if the caller participates.
    pub fn opponent_of(&self, user_id: &str) -> Option<&PlayerRef> {
        match self.participants.iter().position(|p| p.user_id == user_id) {
            Some(index) => self.participants.get(1 - index),
            None => None,
        }
    }

    /// Whether `user_id` is one of the two participants.
    pub fn involves(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p.user_id == user_id)
    }
}

/// Result of resolving a user against the registry.
#[derive(Debug)]
pub enum UserLookup<'a> {
    /// The user occupies no session.
    Unmapped,
    /// The user is a participant of this live session.
    Active(&'a DuelSession),
    /// The user was mapped to a session that no longer exists; the stale
    /// mapping has been deleted as a side effect of this lookup.
    Healed(Uuid),
}

/// Registry of active sessions plus the user-to-session reverse index used
/// for busy checks.
///
/// Invariant: a session id is present iff both participant user ids map to
/// it in the reverse index. Lookups that detect a violation repair it and
/// report it instead of masking it.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<Uuid, DuelSession>,
    by_user: HashMap<String, Uuid>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session and both reverse mappings.
    ///
    /// Callers must have verified, under the same lock, that neither
    /// participant is currently mapped.
    pub fn register(&mut self, session: DuelSession) {
        for participant in &session.participants {
            self.by_user
                .insert(participant.user_id.clone(), session.id);
        }
        self.sessions.insert(session.id, session);
    }

    /// Look up a session by identifier.
    pub fn get(&self, id: &Uuid) -> Option<&DuelSession> {
        self.sessions.get(id)
    }

    /// Whether the given user currently occupies a session mapping.
    ///
    /// This is the cheap read used by busy checks; it does not self-heal.
    pub fn is_engaged(&self, user_id: &str) -> bool {
        self.by_user.contains_key(user_id)
    }

    /// Resolve the session a user occupies, repairing dangling mappings.
    pub fn session_for_user(&mut self, user_id: &str) -> UserLookup<'_> {
        let Some(&session_id) = self.by_user.get(user_id) else {
            return UserLookup::Unmapped;
        };

        match self.sessions.get(&session_id) {
            Some(session) => UserLookup::Active(session),
            None => {
                self.by_user.remove(user_id);
                UserLookup::Healed(session_id)
            }
        }
    }

    /// Remove a session and both reverse mappings, returning the session.
    ///
    /// Mappings are only removed when they still point at the session being
    /// deleted, so a user re-paired in the meantime keeps their new mapping.
    pub fn remove(&mut self, id: &Uuid) -> Option<DuelSession> {
        let session = self.sessions.remove(id)?;
        for participant in &session.participants {
            if self.by_user.get(&participant.user_id) == Some(id) {
                self.by_user.remove(&participant.user_id);
            }
        }
        Some(session)
    }

    /// Test hook: drop the primary record while keeping the reverse
    /// mappings, simulating a partially lost registry.
    #[cfg(test)]
    pub(crate) fn lose_record(&mut self, id: &Uuid) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is active.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str) -> PlayerRef {
        PlayerRef {
            user_id: id.into(),
            display_name: id.to_uppercase(),
        }
    }

    fn session(a: &str, b: &str) -> DuelSession {
        let id = Uuid::new_v4();
        DuelSession {
            id,
            mode: DuelMode::Ranked,
            participants: [player(a), player(b)],
            channel_id: format!("duel-{}", id.simple()),
            origin: SessionOrigin::Queue,
            created_at: SystemTime::now(),
            started_at: Instant::now(),
        }
    }

    fn invariants_hold(registry: &SessionRegistry) -> bool {
        registry.sessions.iter().all(|(id, session)| {
            session
                .participants
                .iter()
                .all(|p| registry.by_user.get(&p.user_id) == Some(id))
        }) && registry
            .by_user
            .values()
            .all(|id| registry.sessions.contains_key(id))
    }

    #[test]
    fn register_creates_both_reverse_mappings() {
        let mut registry = SessionRegistry::new();
        let s = session("ada", "bob");
        let id = s.id;
        registry.register(s);

        assert!(registry.is_engaged("ada"));
        assert!(registry.is_engaged("bob"));
        assert!(matches!(
            registry.session_for_user("ada"),
            UserLookup::Active(found) if found.id == id
        ));
        assert!(invariants_hold(&registry));
    }

    #[test]
    fn remove_deletes_session_and_mappings() {
        let mut registry = SessionRegistry::new();
        let s = session("ada", "bob");
        let id = s.id;
        registry.register(s);

        let removed = registry.remove(&id).unwrap();
        assert_eq!(removed.id, id);
        assert!(!registry.is_engaged("ada"));
        assert!(!registry.is_engaged("bob"));
        assert!(registry.is_empty());
        assert!(invariants_hold(&registry));
    }

    #[test]
    fn dangling_mapping_is_healed_by_a_single_lookup() {
        let mut registry = SessionRegistry::new();
        let s = session("ada", "bob");
        let id = s.id;
        registry.register(s);

        // Simulate a lost primary record while the reverse index survives.
        registry.sessions.remove(&id);

        match registry.session_for_user("ada") {
            UserLookup::Healed(stale) => assert_eq!(stale, id),
            other => panic!("expected healed lookup, got {other:?}"),
        }
        // The repair happened during the lookup itself.
        assert!(!registry.is_engaged("ada"));
        assert!(matches!(
            registry.session_for_user("ada"),
            UserLookup::Unmapped
        ));
    }

    #[test]
    fn remove_keeps_mappings_that_point_elsewhere() {
        let mut registry = SessionRegistry::new();
        let first = session("ada", "bob");
        let first_id = first.id;
        registry.register(first);

        // Re-pair ada into a newer session without tearing down the first.
        let second = session("ada", "eve");
        let second_id = second.id;
        registry.register(second);

        registry.remove(&first_id);
        assert!(registry.is_engaged("ada"));
        assert!(matches!(
            registry.session_for_user("ada"),
            UserLookup::Active(found) if found.id == second_id
        ));
    }

    #[test]
    fn opponent_resolution() {
        let s = session("ada", "bob");
        assert_eq!(s.opponent_of("ada").unwrap().user_id, "bob");
        assert_eq!(s.opponent_of("bob").unwrap().user_id, "ada");
        assert!(s.opponent_of("eve").is_none());
    }
}
