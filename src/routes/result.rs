use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::result::{ReportRequest, ReportResponse, ResultStatusQuery, ResultStatusResponse},
    error::AppError,
    services::result_service,
    state::SharedState,
};

/// Routes handling outcome reporting and the result status poll.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/result/report", post(report_result))
        .route("/result/status", get(result_status))
}

/// Submit one side's outcome report for a session.
#[utoipa::path(
    post,
    path = "/result/report",
    tag = "result",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Report recorded or session finalized", body = ReportResponse),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "No session or outcome record"),
        (status = 409, description = "This participant already reported")
    )
)]
pub async fn report_result(
    State(state): State<SharedState>,
    Json(payload): Json<ReportRequest>,
) -> Result<Json<ReportResponse>, AppError> {
    payload.validate()?;
    let response = result_service::report(&state, payload).await?;
    Ok(Json(response))
}

/// Poll whether a session has been reconciled.
#[utoipa::path(
    get,
    path = "/result/status",
    tag = "result",
    params(ResultStatusQuery),
    responses((status = 200, description = "Reconciliation progress", body = ResultStatusResponse))
)]
pub async fn result_status(
    State(state): State<SharedState>,
    Query(query): Query<ResultStatusQuery>,
) -> Json<ResultStatusResponse> {
    Json(result_service::status(&state, query.session_id).await)
}
