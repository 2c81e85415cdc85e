//! Deterministic naming of the external video channels clients join.
//!
//! The video collaborator only needs a stable identifier; both clients must
//! derive the same name without coordination.

use uuid::Uuid;

/// Channel name for a queue-originated session.
pub fn session_channel(session_id: &Uuid) -> String {
    format!("duel-{}", session_id.simple())
}

/// Channel name for a room and any session derived from it.
///
/// Keyed by the canonical code rather than the session so the name the
/// creator obtained at creation time stays valid across seat 2 churn.
pub fn room_channel(code: &str) -> String {
    format!("room-{}", code.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_are_deterministic() {
        let id = Uuid::new_v4();
        assert_eq!(session_channel(&id), session_channel(&id));
        assert_eq!(room_channel("ABC123"), room_channel("ABC123"));
    }

    #[test]
    fn room_channel_is_case_stable() {
        assert_eq!(room_channel("ABC123"), room_channel("abc123"));
    }
}
