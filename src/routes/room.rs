use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::room::{
        CreateRoomRequest, CreateRoomResponse, JoinRoomRequest, JoinRoomResponse,
        LeaveRoomRequest, LeaveRoomResponse, RoomStatusQuery, RoomStatusResponse,
    },
    error::AppError,
    services::room_service,
    state::SharedState,
};

/// Routes handling private code-addressed rooms.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/room/create", post(create_room))
        .route("/room/join", post(join_room))
        .route("/room/leave", post(leave_room))
        .route("/room/status", get(room_status))
}

/// Open a private room, optionally with a chosen code.
#[utoipa::path(
    post,
    path = "/room/create",
    tag = "room",
    request_body = CreateRoomRequest,
    responses(
        (status = 200, description = "Room created", body = CreateRoomResponse),
        (status = 409, description = "Requested code in use, or caller already busy")
    )
)]
pub async fn create_room(
    State(state): State<SharedState>,
    Json(payload): Json<CreateRoomRequest>,
) -> Result<Json<CreateRoomResponse>, AppError> {
    payload.validate()?;
    let response = room_service::create(&state, payload).await?;
    Ok(Json(response))
}

/// Join a private room as the challenger.
#[utoipa::path(
    post,
    path = "/room/join",
    tag = "room",
    request_body = JoinRoomRequest,
    responses(
        (status = 200, description = "Room joined; session derived", body = JoinRoomResponse),
        (status = 404, description = "No open room carries this code"),
        (status = 409, description = "Room full, or caller already busy")
    )
)]
pub async fn join_room(
    State(state): State<SharedState>,
    Json(payload): Json<JoinRoomRequest>,
) -> Result<Json<JoinRoomResponse>, AppError> {
    payload.validate()?;
    let response = room_service::join(&state, payload).await?;
    Ok(Json(response))
}

/// Leave whatever room seats the caller.
#[utoipa::path(
    post,
    path = "/room/leave",
    tag = "room",
    request_body = LeaveRoomRequest,
    responses((status = 200, description = "Seat vacated or room destroyed", body = LeaveRoomResponse))
)]
pub async fn leave_room(
    State(state): State<SharedState>,
    Json(payload): Json<LeaveRoomRequest>,
) -> Result<Json<LeaveRoomResponse>, AppError> {
    payload.validate()?;
    Ok(Json(room_service::leave(&state, payload).await))
}

/// Poll the occupancy of a room.
#[utoipa::path(
    get,
    path = "/room/status",
    tag = "room",
    params(RoomStatusQuery),
    responses(
        (status = 200, description = "Room occupancy", body = RoomStatusResponse),
        (status = 403, description = "Caller is not seated in the room")
    )
)]
pub async fn room_status(
    State(state): State<SharedState>,
    Query(query): Query<RoomStatusQuery>,
) -> Result<Json<RoomStatusResponse>, AppError> {
    let response = room_service::status(&state, &query.user_id, &query.room_id).await?;
    Ok(Json(response))
}
