use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the duel coordinator.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::matchmaking::join_queue,
        crate::routes::matchmaking::leave_queue,
        crate::routes::matchmaking::duel_status,
        crate::routes::room::create_room,
        crate::routes::room::join_room,
        crate::routes::room::leave_room,
        crate::routes::room::room_status,
        crate::routes::result::report_result,
        crate::routes::result::result_status,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::matchmaking::PlayerInput,
            crate::dto::matchmaking::DuelModeDto,
            crate::dto::matchmaking::JoinQueueRequest,
            crate::dto::matchmaking::JoinQueueResponse,
            crate::dto::matchmaking::LeaveQueueRequest,
            crate::dto::matchmaking::LeaveQueueResponse,
            crate::dto::matchmaking::SearchStatus,
            crate::dto::matchmaking::DuelStatus,
            crate::dto::matchmaking::DuelStatusResponse,
            crate::dto::matchmaking::SessionSnapshot,
            crate::dto::matchmaking::OpponentSnapshot,
            crate::dto::room::CreateRoomRequest,
            crate::dto::room::CreateRoomResponse,
            crate::dto::room::JoinRoomRequest,
            crate::dto::room::JoinRoomResponse,
            crate::dto::room::LeaveRoomRequest,
            crate::dto::room::LeaveRoomResponse,
            crate::dto::room::RoomStatus,
            crate::dto::room::RoomStatusResponse,
            crate::dto::result::OutcomeDto,
            crate::dto::result::ReportRequest,
            crate::dto::result::ReportStatus,
            crate::dto::result::ReportResponse,
            crate::dto::result::ResultPollStatus,
            crate::dto::result::ResultStatusResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "duel", description = "Public matchmaking queue and status polling"),
        (name = "room", description = "Private code-addressed rooms"),
        (name = "result", description = "Outcome reporting and reconciliation"),
    )
)]
pub struct ApiDoc;
