//! DTOs for outcome reporting and the result status poll.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::validation::validate_user_id,
    state::outcome::ReportedOutcome,
};

/// Wire representation of a claimed outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeDto {
    /// The reporting player claims victory.
    Win,
    /// The reporting player concedes defeat.
    Loss,
    /// The reporting player claims a draw.
    Draw,
}

impl From<OutcomeDto> for ReportedOutcome {
    fn from(value: OutcomeDto) -> Self {
        match value {
            OutcomeDto::Win => ReportedOutcome::Win,
            OutcomeDto::Loss => ReportedOutcome::Loss,
            OutcomeDto::Draw => ReportedOutcome::Draw,
        }
    }
}

/// One side's report of a finished duel.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// The reporting participant.
    #[validate(custom(function = validate_user_id))]
    pub user_id: String,
    /// Session the report belongs to.
    pub session_id: Uuid,
    /// Outcome from the caller's point of view.
    pub outcome: OutcomeDto,
    /// Caller's view of the opponent, used to reconstruct a pending outcome
    /// when the server lost the session.
    #[serde(default)]
    pub opponent_id: Option<String>,
    /// Caller's view of the mode, honored only on the reconstruction path.
    #[serde(default)]
    pub is_ranked: Option<bool>,
}

/// Final classification of a report as seen by one caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// The peer has not reported yet; poll `result/status` for progress.
    Waiting,
    /// Decisive result; the caller won.
    Win,
    /// Decisive result; the caller lost.
    Loss,
    /// Both sides reported a draw.
    Draw,
    /// The two reports disagree; no score was mutated and the session is
    /// torn down pending manual resolution.
    Conflict,
    /// The reports were reconciled but the score write failed; the result
    /// was logged for manual reconciliation.
    LedgerFailure,
}

/// Response to an outcome report.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    /// Classification after this report.
    pub status: ReportStatus,
    /// Human readable explanation, tailored to the caller.
    pub message: String,
    /// User whose ledger entry was updated by this call, when a ranked
    /// delta was applied for the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_score_owner: Option<String>,
}

/// Query parameters of the result status poll.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ResultStatusQuery {
    /// Session being polled.
    pub session_id: Uuid,
}

/// Reconciliation progress of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResultPollStatus {
    /// The session is still live or one report is missing.
    Waiting,
    /// The session has been reconciled and torn down.
    Resolved,
}

/// Response of the result status poll.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultStatusResponse {
    /// Reconciliation progress.
    pub status: ResultPollStatus,
}
