use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::dao::ledger::LedgerError;

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Score ledger backend is unavailable.
    #[error("score ledger unavailable")]
    Unavailable(#[source] LedgerError),
    /// Application is running in degraded mode without a ledger.
    #[error("score ledger unavailable (degraded mode)")]
    Degraded,
    /// User is already queued, in a session, or seated in a room.
    #[error("already busy: {0}")]
    AlreadyBusy(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Caller is not a participant of the targeted session or room.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Room already has both seats taken.
    #[error("room full: {0}")]
    Full(String),
    /// The requested room code is already taken.
    #[error("code in use: {0}")]
    CodeInUse(String),
    /// This participant already submitted an outcome for the session.
    #[error("already submitted: {0}")]
    AlreadySubmitted(String),
    /// A dangling user-to-session mapping was detected and repaired.
    #[error("session desync detected: {0}")]
    SyncError(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<LedgerError> for ServiceError {
    fn from(err: LedgerError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Caller may not act on this resource.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current coordinator state; `code` names the condition.
    #[error("conflict: {message}")]
    Conflict {
        /// Machine-readable condition (e.g. `already_busy`, `sync_error`).
        code: &'static str,
        /// Human readable description.
        message: String,
    },
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::AlreadyBusy(message) => AppError::Conflict {
                code: "already_busy",
                message,
            },
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Forbidden(message) => AppError::Forbidden(message),
            ServiceError::Full(message) => AppError::Conflict {
                code: "room_full",
                message,
            },
            ServiceError::CodeInUse(message) => AppError::Conflict {
                code: "code_in_use",
                message,
            },
            ServiceError::AlreadySubmitted(message) => AppError::Conflict {
                code: "already_submitted",
                message,
            },
            ServiceError::SyncError(message) => AppError::Conflict {
                code: "sync_error",
                message,
            },
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let code = match &self {
            AppError::Conflict { code, .. } => Some(*code),
            _ => None,
        };

        let payload = Json(ErrorBody {
            code,
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
