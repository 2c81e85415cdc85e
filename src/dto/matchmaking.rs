//! DTOs for the public matchmaking queue and the duel status poll.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        format_system_time,
        validation::{validate_display_name, validate_user_id},
    },
    state::session::{DuelMode, DuelSession, PlayerRef, SessionOrigin},
};

/// Player identity submitted with pairing requests.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInput {
    /// Stable account identifier.
    #[validate(custom(function = validate_user_id))]
    pub user_id: String,
    /// Name shown to the opponent.
    #[validate(custom(function = validate_display_name))]
    pub display_name: String,
}

impl From<PlayerInput> for PlayerRef {
    fn from(value: PlayerInput) -> Self {
        Self {
            user_id: value.user_id,
            display_name: value.display_name,
        }
    }
}

/// Wire representation of a duel mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DuelModeDto {
    /// Outcome affects ranked scores.
    Ranked,
    /// Friendly match.
    Casual,
}

impl From<DuelModeDto> for DuelMode {
    fn from(value: DuelModeDto) -> Self {
        match value {
            DuelModeDto::Ranked => DuelMode::Ranked,
            DuelModeDto::Casual => DuelMode::Casual,
        }
    }
}

impl From<DuelMode> for DuelModeDto {
    fn from(value: DuelMode) -> Self {
        match value {
            DuelMode::Ranked => DuelModeDto::Ranked,
            DuelMode::Casual => DuelModeDto::Casual,
        }
    }
}

/// Request to enter the public matchmaking queue.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinQueueRequest {
    /// The joining player.
    #[validate(nested)]
    pub user: PlayerInput,
    /// Partition to search in.
    pub mode: DuelModeDto,
}

/// Search state reported by a join attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    /// The caller is searching; a match may already be waiting in the poll.
    Searching,
    /// The caller was already searching or engaged; nothing changed.
    AlreadySearching,
}

/// Response to a queue join.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinQueueResponse {
    /// Search state after the call.
    pub status: SearchStatus,
    /// Human readable explanation.
    pub message: String,
}

/// Request to abandon the public queue.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LeaveQueueRequest {
    /// User leaving the queue.
    #[validate(custom(function = validate_user_id))]
    pub user_id: String,
}

/// Response to a queue leave.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveQueueResponse {
    /// Human readable explanation.
    pub message: String,
}

/// Query parameters of the duel status poll.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DuelStatusQuery {
    /// User whose pairing state is being polled.
    pub user_id: String,
}

/// Pairing state of a user as seen by the status poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DuelStatus {
    /// Not queued and not in a session.
    Idle,
    /// Waiting in the public queue.
    Searching,
    /// Paired through the queue; the session snapshot is attached.
    Matched,
    /// Paired through a private room; the session snapshot is attached.
    Ready,
    /// A dangling session mapping was detected and repaired; the client
    /// must reset its local state.
    SyncError,
}

/// Opponent identity embedded in a session snapshot.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpponentSnapshot {
    /// Opponent account identifier.
    pub user_id: String,
    /// Opponent display name.
    pub display_name: String,
}

/// Per-caller projection of an active session.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Session identifier, shared by both participants.
    pub session_id: Uuid,
    /// Partition the duel belongs to.
    pub mode: DuelModeDto,
    /// The other participant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent: Option<OpponentSnapshot>,
    /// Video channel both clients join.
    pub channel_id: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl SessionSnapshot {
    /// Build the snapshot as seen by `caller_id`.
    pub fn for_caller(session: &DuelSession, caller_id: &str) -> Self {
        Self {
            session_id: session.id,
            mode: session.mode.into(),
            opponent: session.opponent_of(caller_id).map(|p| OpponentSnapshot {
                user_id: p.user_id.clone(),
                display_name: p.display_name.clone(),
            }),
            channel_id: session.channel_id.clone(),
            created_at: format_system_time(session.created_at),
        }
    }

    /// Status value matching the session's origin.
    pub fn status_for_origin(session: &DuelSession) -> DuelStatus {
        match session.origin {
            SessionOrigin::Queue => DuelStatus::Matched,
            SessionOrigin::PrivateRoom => DuelStatus::Ready,
        }
    }
}

/// Response of the duel status poll.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DuelStatusResponse {
    /// Pairing state of the polled user.
    pub status: DuelStatus,
    /// Present when the user is paired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<SessionSnapshot>,
    /// Present for states that need explanation (e.g. sync errors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
