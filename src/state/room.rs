//! Private, code-addressed two-seat rooms with a lifecycle independent from
//! the public queue.

use std::{collections::HashMap, time::SystemTime};

use rand::Rng;
use uuid::Uuid;

use crate::state::session::PlayerRef;

/// Characters used for generated room codes.
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A private room created by one player for a chosen opponent.
#[derive(Debug, Clone)]
pub struct PrivateRoom {
    /// Canonical (upper-case) room code.
    pub code: String,
    /// Seat 1: the player who created the room and owns its lifecycle.
    pub creator: PlayerRef,
    /// Seat 2: the opponent, once one has joined.
    pub challenger: Option<PlayerRef>,
    /// Session derived from this room while a duel is in progress.
    pub session_id: Option<Uuid>,
    /// Wall-clock creation time.
    pub created_at: SystemTime,
}

impl PrivateRoom {
    /// Whether `user_id` occupies either seat.
    pub fn seats(&self, user_id: &str) -> bool {
        self.creator.user_id == user_id
            || self
                .challenger
                .as_ref()
                .is_some_and(|c| c.user_id == user_id)
    }
}

/// Failure creating a room.
#[derive(Debug, PartialEq, Eq)]
pub enum CreateError {
    /// The explicitly requested code is already taken. The creator asked for
    /// that identity, so this is a hard error rather than a silent fallback.
    CodeInUse,
}

/// Failure joining a room.
#[derive(Debug, PartialEq, Eq)]
pub enum JoinError {
    /// No open room carries this code.
    NotFound,
    /// Both seats are already taken.
    Full,
    /// The creator tried to join their own room.
    SelfJoin,
}

/// Result of removing a user from whatever room seats them.
#[derive(Debug)]
pub enum LeaveOutcome {
    /// The creator left: the whole room is gone. Carries the removed room so
    /// the caller can tear down any derived session.
    Destroyed(PrivateRoom),
    /// The challenger left: seat 2 was vacated and the room stays open.
    Reverted {
        /// Code of the room that reverted to a single seat.
        code: String,
        /// Session that was voided by the departure, if one was in progress.
        voided_session: Option<Uuid>,
    },
    /// The user was not seated anywhere.
    NotPresent,
}

/// Registry of open private rooms, keyed by canonical code.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, PrivateRoom>,
}

/// Canonical form of a room code: trimmed and upper-cased, so lookups are
/// case-insensitive.
pub fn canonical_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

fn random_code(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

impl RoomRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a room for `creator`.
    ///
    /// A supplied code is adopted verbatim (canonicalized) unless taken;
    /// otherwise a free random code of `generated_len` characters is drawn.
    pub fn create(
        &mut self,
        creator: PlayerRef,
        desired_code: Option<&str>,
        generated_len: usize,
    ) -> Result<&PrivateRoom, CreateError> {
        let code = match desired_code {
            Some(desired) => {
                let code = canonical_code(desired);
                if self.rooms.contains_key(&code) {
                    return Err(CreateError::CodeInUse);
                }
                code
            }
            None => loop {
                let candidate = random_code(generated_len);
                if !self.rooms.contains_key(&candidate) {
                    break candidate;
                }
            },
        };

        let room = PrivateRoom {
            code: code.clone(),
            creator,
            challenger: None,
            session_id: None,
            created_at: SystemTime::now(),
        };
        Ok(self.rooms.entry(code).or_insert(room))
    }

    /// Seat `challenger` in the room carrying `code`.
    pub fn join(&mut self, challenger: PlayerRef, code: &str) -> Result<&mut PrivateRoom, JoinError> {
        let code = canonical_code(code);
        let room = self.rooms.get_mut(&code).ok_or(JoinError::NotFound)?;

        if room.creator.user_id == challenger.user_id {
            return Err(JoinError::SelfJoin);
        }
        if room.challenger.is_some() {
            return Err(JoinError::Full);
        }

        room.challenger = Some(challenger);
        Ok(room)
    }

    /// Look up a room by code.
    pub fn get(&self, code: &str) -> Option<&PrivateRoom> {
        self.rooms.get(&canonical_code(code))
    }

    /// Mutable lookup, used to attach the derived session id.
    pub fn get_mut(&mut self, code: &str) -> Option<&mut PrivateRoom> {
        self.rooms.get_mut(&canonical_code(code))
    }

    /// The room seating `user_id`, if any.
    pub fn room_of(&self, user_id: &str) -> Option<&PrivateRoom> {
        self.rooms.values().find(|room| room.seats(user_id))
    }

    /// Remove `user_id` from whatever room seats them.
    ///
    /// The creator leaving destroys the room regardless of seat 2, so no
    /// half-open room can outlive its owner. The challenger leaving only
    /// vacates seat 2 and voids any duel in progress.
    pub fn leave(&mut self, user_id: &str) -> LeaveOutcome {
        let Some(code) = self
            .rooms
            .iter()
            .find(|(_, room)| room.seats(user_id))
            .map(|(code, _)| code.clone())
        else {
            return LeaveOutcome::NotPresent;
        };

        if self
            .rooms
            .get(&code)
            .is_some_and(|room| room.creator.user_id == user_id)
        {
            match self.rooms.remove(&code) {
                Some(room) => LeaveOutcome::Destroyed(room),
                None => LeaveOutcome::NotPresent,
            }
        } else {
            match self.rooms.get_mut(&code) {
                Some(room) => {
                    room.challenger = None;
                    let voided_session = room.session_id.take();
                    LeaveOutcome::Reverted {
                        code,
                        voided_session,
                    }
                }
                None => LeaveOutcome::NotPresent,
            }
        }
    }

    /// Vacate seat 2 of the room whose derived session just ended.
    ///
    /// The creator keeps the room open for a rematch; the challenger must
    /// join again to derive a fresh session. Returns `false` when no room
    /// references the session.
    pub fn release_session(&mut self, session_id: &Uuid) -> bool {
        for room in self.rooms.values_mut() {
            if room.session_id == Some(*session_id) {
                room.session_id = None;
                room.challenger = None;
                return true;
            }
        }
        false
    }

    /// Number of open rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no room is open.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
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

    #[test]
    fn desired_code_is_adopted_canonically() {
        let mut rooms = RoomRegistry::new();
        let room = rooms.create(player("ada"), Some("abc123"), 6).unwrap();
        assert_eq!(room.code, "ABC123");
        assert!(rooms.get("Abc123").is_some());
    }

    #[test]
    fn code_collision_is_a_hard_error() {
        let mut rooms = RoomRegistry::new();
        rooms.create(player("ada"), Some("ABC123"), 6).unwrap();
        assert_eq!(
            rooms.create(player("bob"), Some("abc123"), 6).unwrap_err(),
            CreateError::CodeInUse
        );
    }

    #[test]
    fn generated_codes_use_the_expected_alphabet() {
        let mut rooms = RoomRegistry::new();
        let code = rooms.create(player("ada"), None, 6).unwrap().code.clone();
        assert_eq!(code.len(), 6);
        assert!(code.bytes().all(|b| CODE_CHARSET.contains(&b)));
    }

    #[test]
    fn join_rules() {
        let mut rooms = RoomRegistry::new();
        rooms.create(player("ada"), Some("ABC123"), 6).unwrap();

        assert_eq!(
            rooms.join(player("ada"), "ABC123").unwrap_err(),
            JoinError::SelfJoin
        );
        assert_eq!(
            rooms.join(player("bob"), "NOPE42").unwrap_err(),
            JoinError::NotFound
        );

        rooms.join(player("bob"), "abc123").unwrap();
        assert_eq!(
            rooms.join(player("eve"), "ABC123").unwrap_err(),
            JoinError::Full
        );
    }

    #[test]
    fn creator_leave_destroys_the_room() {
        let mut rooms = RoomRegistry::new();
        rooms.create(player("ada"), Some("ABC123"), 6).unwrap();
        rooms.join(player("bob"), "ABC123").unwrap();
        let session_id = Uuid::new_v4();
        rooms.get_mut("ABC123").unwrap().session_id = Some(session_id);

        match rooms.leave("ada") {
            LeaveOutcome::Destroyed(room) => assert_eq!(room.session_id, Some(session_id)),
            other => panic!("expected destroy, got {other:?}"),
        }
        assert!(rooms.is_empty());
    }

    #[test]
    fn challenger_leave_reverts_the_room() {
        let mut rooms = RoomRegistry::new();
        rooms.create(player("ada"), Some("ABC123"), 6).unwrap();
        rooms.join(player("bob"), "ABC123").unwrap();
        let session_id = Uuid::new_v4();
        rooms.get_mut("ABC123").unwrap().session_id = Some(session_id);

        match rooms.leave("bob") {
            LeaveOutcome::Reverted {
                code,
                voided_session,
            } => {
                assert_eq!(code, "ABC123");
                assert_eq!(voided_session, Some(session_id));
            }
            other => panic!("expected revert, got {other:?}"),
        }

        // The room is open again for a new opponent.
        let room = rooms.get("ABC123").unwrap();
        assert!(room.challenger.is_none());
        assert!(room.session_id.is_none());
        rooms.join(player("eve"), "ABC123").unwrap();
    }

    #[test]
    fn release_session_vacates_seat_two() {
        let mut rooms = RoomRegistry::new();
        rooms.create(player("ada"), Some("ABC123"), 6).unwrap();
        rooms.join(player("bob"), "ABC123").unwrap();
        let session_id = Uuid::new_v4();
        rooms.get_mut("ABC123").unwrap().session_id = Some(session_id);

        assert!(rooms.release_session(&session_id));
        let room = rooms.get("ABC123").unwrap();
        assert!(room.challenger.is_none());
        assert!(room.session_id.is_none());
        assert!(!rooms.release_session(&session_id));
    }

    #[test]
    fn leave_when_not_seated_is_a_noop() {
        let mut rooms = RoomRegistry::new();
        assert!(matches!(rooms.leave("ada"), LeaveOutcome::NotPresent));
    }
}
