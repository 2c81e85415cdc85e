//! DTOs for private room management and the room status poll.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::dto::{
    matchmaking::PlayerInput,
    validation::{validate_room_code, validate_user_id},
};

/// Request to open a private room.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    /// The creating player, who takes seat 1.
    #[validate(nested)]
    pub user: PlayerInput,
    /// Code to adopt for the room; a random one is generated when omitted.
    #[serde(default)]
    #[validate(custom(function = validate_room_code))]
    pub room_id: Option<String>,
}

/// Occupancy state of a private room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// Seat 2 is empty; the creator is waiting for an opponent.
    Waiting,
    /// Both seats are taken and a session has been derived.
    Ready,
    /// No open room carries this code.
    NotFound,
}

/// Response to a room creation.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    /// Room state after the call (always `waiting`).
    pub status: RoomStatus,
    /// Canonical code of the created room.
    pub room_id: String,
    /// Video channel derived from the room code.
    pub channel_id: String,
    /// Human readable explanation.
    pub message: String,
}

/// Request to join a private room as the challenger.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    /// The joining player, who takes seat 2.
    #[validate(nested)]
    pub user: PlayerInput,
    /// Code of the room to join.
    #[validate(custom(function = validate_room_code))]
    pub room_id: String,
}

/// Response to a successful room join.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomResponse {
    /// Room state after the call (always `ready`).
    pub status: RoomStatus,
    /// Canonical code of the joined room.
    pub room_id: String,
    /// Display name of the room creator.
    pub opponent: String,
    /// Video channel derived from the room code.
    pub channel_id: String,
    /// Human readable explanation.
    pub message: String,
}

/// Request to leave whatever room seats the user.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoomRequest {
    /// User leaving their room.
    #[validate(custom(function = validate_user_id))]
    pub user_id: String,
}

/// Response to a room leave.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoomResponse {
    /// Human readable explanation.
    pub message: String,
}

/// Query parameters of the room status poll.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RoomStatusQuery {
    /// Polling user; must occupy a seat of the room.
    pub user_id: String,
    /// Code of the polled room.
    pub room_id: String,
}

/// Response of the room status poll.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomStatusResponse {
    /// Occupancy state of the room.
    pub status: RoomStatus,
    /// Display name of the other seat, when taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent: Option<String>,
    /// Whether the polling user created the room.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_creator: Option<bool>,
    /// Human readable explanation.
    pub message: String,
}
