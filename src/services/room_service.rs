//! Business logic for private rooms: creation, joining, leaving, and the
//! room status poll. Seat 2 joining derives a session in the shared
//! registry, so result reporting treats queue and room duels uniformly.

use std::time::{Instant, SystemTime};

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dto::room::{
        CreateRoomRequest, CreateRoomResponse, JoinRoomRequest, JoinRoomResponse,
        LeaveRoomRequest, LeaveRoomResponse, RoomStatus, RoomStatusResponse,
    },
    error::ServiceError,
    services::{eligibility, video},
    state::{
        SharedState,
        room::{JoinError, LeaveOutcome, canonical_code},
        session::{DuelMode, DuelSession, PlayerRef, SessionOrigin},
    },
};

/// Open a private room with the caller in seat 1.
pub async fn create(
    state: &SharedState,
    request: CreateRoomRequest,
) -> Result<CreateRoomResponse, ServiceError> {
    let creator: PlayerRef = request.user.into();

    let mut sessions = state.sessions().lock().await;
    let queue = state.queue().lock().await;
    let mut rooms = state.rooms().lock().await;

    eligibility::ensure_free(&mut sessions, &queue, &rooms, &creator.user_id)?;

    let room = rooms
        .create(
            creator,
            request.room_id.as_deref(),
            state.config().room_code_len,
        )
        .map_err(|_| {
            ServiceError::CodeInUse(format!(
                "room code `{}` is already in use",
                request
                    .room_id
                    .as_deref()
                    .map(canonical_code)
                    .unwrap_or_default()
            ))
        })?;

    info!(room = %room.code, "private room created");
    Ok(CreateRoomResponse {
        status: RoomStatus::Waiting,
        room_id: room.code.clone(),
        channel_id: video::room_channel(&room.code),
        message: "Room created; share the code with your opponent".into(),
    })
}

/// Take seat 2 of an open room and derive the duel session.
///
/// Room duels are friendly matches; they never touch the ranked ledger.
pub async fn join(
    state: &SharedState,
    request: JoinRoomRequest,
) -> Result<JoinRoomResponse, ServiceError> {
    let challenger: PlayerRef = request.user.into();

    let mut sessions = state.sessions().lock().await;
    let queue = state.queue().lock().await;
    let mut rooms = state.rooms().lock().await;

    eligibility::ensure_free(&mut sessions, &queue, &rooms, &challenger.user_id)?;

    let room = rooms
        .join(challenger.clone(), &request.room_id)
        .map_err(|err| match err {
            JoinError::NotFound => ServiceError::NotFound(format!(
                "room `{}` not found",
                canonical_code(&request.room_id)
            )),
            JoinError::Full => ServiceError::Full(format!(
                "room `{}` already has two players",
                canonical_code(&request.room_id)
            )),
            JoinError::SelfJoin => {
                ServiceError::InvalidInput("you cannot join your own room".into())
            }
        })?;

    let id = Uuid::new_v4();
    let session = DuelSession {
        id,
        mode: DuelMode::Casual,
        participants: [room.creator.clone(), challenger],
        channel_id: video::room_channel(&room.code),
        origin: SessionOrigin::PrivateRoom,
        created_at: SystemTime::now(),
        started_at: Instant::now(),
    };
    room.session_id = Some(id);

    let room_id = room.code.clone();
    let opponent = room.creator.display_name.clone();
    let channel_id = video::room_channel(&room.code);

    info!(room = %room_id, session = %id, "private room filled; session derived");
    sessions.register(session);

    Ok(JoinRoomResponse {
        status: RoomStatus::Ready,
        room_id,
        opponent,
        channel_id,
        message: "Opponent found; the duel can begin".into(),
    })
}

/// Remove the caller from whatever room seats them.
///
/// The creator leaving destroys the room and any derived session; the
/// challenger leaving reverts the room and voids the duel in progress.
/// Either way the affected players stop occupying the session registry.
pub async fn leave(state: &SharedState, request: LeaveRoomRequest) -> LeaveRoomResponse {
    let mut sessions = state.sessions().lock().await;
    let mut rooms = state.rooms().lock().await;
    let mut outcomes = state.outcomes().lock().await;

    let message = match rooms.leave(&request.user_id) {
        LeaveOutcome::Destroyed(room) => {
            if let Some(session_id) = room.session_id {
                sessions.remove(&session_id);
                outcomes.remove(&session_id);
            }
            info!(room = %room.code, "room destroyed by its creator");
            "Room closed"
        }
        LeaveOutcome::Reverted {
            code,
            voided_session,
        } => {
            if let Some(session_id) = voided_session {
                sessions.remove(&session_id);
                outcomes.remove(&session_id);
                debug!(room = %code, session = %session_id, "duel voided by challenger leave");
            }
            "Left the room; it stays open for its creator"
        }
        LeaveOutcome::NotPresent => "You are not in a room",
    };

    LeaveRoomResponse {
        message: message.into(),
    }
}

/// Poll the occupancy of a room the caller is seated in.
pub async fn status(
    state: &SharedState,
    user_id: &str,
    room_id: &str,
) -> Result<RoomStatusResponse, ServiceError> {
    let rooms = state.rooms().lock().await;

    let Some(room) = rooms.get(room_id) else {
        return Ok(RoomStatusResponse {
            status: RoomStatus::NotFound,
            opponent: None,
            is_creator: None,
            message: "Room not found".into(),
        });
    };

    if !room.seats(user_id) {
        return Err(ServiceError::Forbidden(format!(
            "user `{user_id}` is not seated in room `{}`",
            room.code
        )));
    }

    let is_creator = room.creator.user_id == user_id;
    match room.challenger {
        Some(ref challenger) => {
            let opponent = if is_creator {
                challenger.display_name.clone()
            } else {
                room.creator.display_name.clone()
            };
            Ok(RoomStatusResponse {
                status: RoomStatus::Ready,
                opponent: Some(opponent),
                is_creator: Some(is_creator),
                message: "Opponent present".into(),
            })
        }
        None => Ok(RoomStatusResponse {
            status: RoomStatus::Waiting,
            opponent: None,
            is_creator: Some(is_creator),
            message: "Waiting for an opponent".into(),
        }),
    }
}
