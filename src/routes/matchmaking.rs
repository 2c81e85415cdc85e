use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::matchmaking::{
        DuelStatusQuery, DuelStatusResponse, JoinQueueRequest, JoinQueueResponse,
        LeaveQueueRequest, LeaveQueueResponse,
    },
    error::AppError,
    services::matchmaking_service,
    state::SharedState,
};

/// Routes handling the public matchmaking queue and the duel status poll.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/duel/join", post(join_queue))
        .route("/duel/leave", post(leave_queue))
        .route("/duel/status", get(duel_status))
}

/// Enter the public matchmaking queue.
#[utoipa::path(
    post,
    path = "/duel/join",
    tag = "duel",
    request_body = JoinQueueRequest,
    responses(
        (status = 200, description = "Search started or already running", body = JoinQueueResponse),
        (status = 409, description = "Dangling session mapping repaired; reset and retry")
    )
)]
pub async fn join_queue(
    State(state): State<SharedState>,
    Json(payload): Json<JoinQueueRequest>,
) -> Result<Json<JoinQueueResponse>, AppError> {
    payload.validate()?;
    let response = matchmaking_service::join(&state, payload).await?;
    Ok(Json(response))
}

/// Leave the public matchmaking queue.
#[utoipa::path(
    post,
    path = "/duel/leave",
    tag = "duel",
    request_body = LeaveQueueRequest,
    responses((status = 200, description = "Queue left (or nothing to leave)", body = LeaveQueueResponse))
)]
pub async fn leave_queue(
    State(state): State<SharedState>,
    Json(payload): Json<LeaveQueueRequest>,
) -> Result<Json<LeaveQueueResponse>, AppError> {
    payload.validate()?;
    Ok(Json(matchmaking_service::leave(&state, payload).await))
}

/// Poll the pairing state of a user.
#[utoipa::path(
    get,
    path = "/duel/status",
    tag = "duel",
    params(DuelStatusQuery),
    responses((status = 200, description = "Current pairing state", body = DuelStatusResponse))
)]
pub async fn duel_status(
    State(state): State<SharedState>,
    Query(query): Query<DuelStatusQuery>,
) -> Json<DuelStatusResponse> {
    Json(matchmaking_service::status(&state, &query.user_id).await)
}
