//! Business logic for the public matchmaking queue and the duel status
//! poll. Matching is discovered asymmetrically: the join that completes a
//! pair still answers `searching`, and both sides learn about the session on
//! their next poll.

use std::time::{Instant, SystemTime};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::matchmaking::{
        DuelStatus, DuelStatusResponse, JoinQueueRequest, JoinQueueResponse, LeaveQueueRequest,
        LeaveQueueResponse, SearchStatus, SessionSnapshot,
    },
    error::ServiceError,
    services::{eligibility, video},
    state::{
        SharedState,
        queue::JoinOutcome,
        session::{DuelMode, DuelSession, PlayerRef, SessionOrigin, UserLookup},
    },
};

/// Enter the public queue, pairing with the longest-waiting compatible
/// player when one exists.
///
/// A caller that is already queued or engaged receives `already_searching`
/// rather than an error, so duplicate client retries are harmless.
pub async fn join(
    state: &SharedState,
    request: JoinQueueRequest,
) -> Result<JoinQueueResponse, ServiceError> {
    let player: PlayerRef = request.user.into();
    let mode: DuelMode = request.mode.into();

    let mut sessions = state.sessions().lock().await;
    let mut queue = state.queue().lock().await;

    {
        let rooms = state.rooms().lock().await;
        match eligibility::ensure_free(&mut sessions, &queue, &rooms, &player.user_id) {
            Ok(()) => {}
            Err(ServiceError::AlreadyBusy(_)) => {
                return Ok(JoinQueueResponse {
                    status: SearchStatus::AlreadySearching,
                    message: "You are already searching or in a duel".into(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    let now = Instant::now();
    let evicted = queue.evict_stale(now, state.config().queue_ttl);
    if evicted > 0 {
        debug!(evicted, "evicted stale matchmaking entries");
    }

    match queue.join(player.clone(), mode, now) {
        JoinOutcome::AlreadyQueued => Ok(JoinQueueResponse {
            status: SearchStatus::AlreadySearching,
            message: "You are already searching".into(),
        }),
        JoinOutcome::Queued => Ok(JoinQueueResponse {
            status: SearchStatus::Searching,
            message: "Searching for an opponent".into(),
        }),
        JoinOutcome::Matched(waiting) => {
            let id = Uuid::new_v4();
            let session = DuelSession {
                id,
                mode,
                participants: [waiting.player, player],
                channel_id: video::session_channel(&id),
                origin: SessionOrigin::Queue,
                created_at: SystemTime::now(),
                started_at: now,
            };
            info!(session = %id, "paired players from the public queue");
            sessions.register(session);

            // Both sides discover the pairing on their next status poll.
            Ok(JoinQueueResponse {
                status: SearchStatus::Searching,
                message: "Searching for an opponent".into(),
            })
        }
    }
}

/// Leave the public queue. Losing the race against a match is a no-op.
pub async fn leave(state: &SharedState, request: LeaveQueueRequest) -> LeaveQueueResponse {
    let mut queue = state.queue().lock().await;
    let message = if queue.leave(&request.user_id) {
        "Left the matchmaking queue"
    } else {
        "You were not in the queue"
    };
    LeaveQueueResponse {
        message: message.into(),
    }
}

/// Resolve the pairing state of a user.
///
/// The session index wins over queue membership; the two should be mutually
/// exclusive, but an active session is authoritative either way. A dangling
/// mapping is repaired here and reported as a sync error so the client fully
/// resets instead of silently dropping back to idle.
pub async fn status(state: &SharedState, user_id: &str) -> DuelStatusResponse {
    let mut sessions = state.sessions().lock().await;

    match sessions.session_for_user(user_id) {
        UserLookup::Active(session) => DuelStatusResponse {
            status: SessionSnapshot::status_for_origin(session),
            game: Some(SessionSnapshot::for_caller(session, user_id)),
            message: None,
        },
        UserLookup::Healed(stale) => {
            warn!(
                user = user_id,
                session = %stale,
                "repaired dangling session mapping during status poll"
            );
            DuelStatusResponse {
                status: DuelStatus::SyncError,
                game: None,
                message: Some(
                    "Your session no longer exists on the server; reset and pair again".into(),
                ),
            }
        }
        UserLookup::Unmapped => {
            let queue = state.queue().lock().await;
            let status = if queue.contains(user_id) {
                DuelStatus::Searching
            } else {
                DuelStatus::Idle
            };
            DuelStatusResponse {
                status,
                game: None,
                message: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dto::matchmaking::{DuelModeDto, PlayerInput},
        state::AppState,
    };

    fn join_request(id: &str) -> JoinQueueRequest {
        JoinQueueRequest {
            user: PlayerInput {
                user_id: id.into(),
                display_name: id.to_uppercase(),
            },
            mode: DuelModeDto::Ranked,
        }
    }

    #[tokio::test]
    async fn lost_session_record_surfaces_sync_error_then_idle() {
        let state = AppState::new(AppConfig::default());
        join(&state, join_request("ada")).await.unwrap();
        join(&state, join_request("bob")).await.unwrap();

        let session_id = status(&state, "ada")
            .await
            .game
            .expect("ada should be paired")
            .session_id;

        // Lose the primary record while both reverse mappings survive.
        assert!(state.sessions().lock().await.lose_record(&session_id));

        // The first poll reports the desync and repairs the mapping.
        let first = status(&state, "ada").await;
        assert_eq!(first.status, DuelStatus::SyncError);
        assert!(first.game.is_none());

        // The very next poll finds a clean slate.
        let second = status(&state, "ada").await;
        assert_eq!(second.status, DuelStatus::Idle);

        // Each side heals its own mapping on its own poll.
        assert_eq!(status(&state, "bob").await.status, DuelStatus::SyncError);
        assert_eq!(status(&state, "bob").await.status, DuelStatus::Idle);
    }
}
