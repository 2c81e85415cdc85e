//! Shared busy check deciding whether a user may enter a new pairing flow.

use crate::{
    error::ServiceError,
    state::{
        queue::MatchQueue,
        room::RoomRegistry,
        session::{SessionRegistry, UserLookup},
    },
};

/// Verify that `user_id` is in none of: an active session, the public
/// queue, a private room seat.
///
/// Every pairing entry point funnels through this single predicate so the
/// waiting/in-session mutual exclusion is enforced at one choke point.
/// Callers must hold the corresponding registry locks for the whole
/// operation; the check is only meaningful under them.
///
/// A dangling session mapping found here is repaired on the spot and
/// surfaced as a sync error so the client resets instead of retrying into a
/// corrupt flow.
pub fn ensure_free(
    sessions: &mut SessionRegistry,
    queue: &MatchQueue,
    rooms: &RoomRegistry,
    user_id: &str,
) -> Result<(), ServiceError> {
    match sessions.session_for_user(user_id) {
        UserLookup::Active(session) => {
            return Err(ServiceError::AlreadyBusy(format!(
                "user `{user_id}` is already in session `{}`",
                session.id
            )));
        }
        UserLookup::Healed(stale) => {
            return Err(ServiceError::SyncError(format!(
                "user `{user_id}` was mapped to missing session `{stale}`; \
                 the mapping was repaired, reset your state and retry"
            )));
        }
        UserLookup::Unmapped => {}
    }

    if queue.contains(user_id) {
        return Err(ServiceError::AlreadyBusy(format!(
            "user `{user_id}` is already searching"
        )));
    }

    if let Some(room) = rooms.room_of(user_id) {
        return Err(ServiceError::AlreadyBusy(format!(
            "user `{user_id}` is already seated in room `{}`",
            room.code
        )));
    }

    Ok(())
}
