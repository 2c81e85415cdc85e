//! The outcome reconciler: accepts the two independently-submitted result
//! reports of a finished duel and turns them into a single scoring decision,
//! then tears the session down so neither player can re-report.

use std::time::Instant;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    dto::result::{
        ReportRequest, ReportResponse, ReportStatus, ResultPollStatus, ResultStatusResponse,
    },
    error::ServiceError,
    state::{
        SharedState,
        outcome::{OutcomeBoard, PendingOutcome, ReportedOutcome, Verdict},
        room::RoomRegistry,
        session::{SessionRegistry, SessionOrigin},
    },
};

/// Which ledger writes were left unapplied when finalization failed.
#[derive(Debug, Clone, Copy)]
enum Unapplied {
    /// Neither delta reached the ledger.
    Both,
    /// The winner's delta was committed; the loser's was not.
    Loser,
}

/// Record one participant's outcome report and finalize the session once
/// both are present.
pub async fn report(
    state: &SharedState,
    request: ReportRequest,
) -> Result<ReportResponse, ServiceError> {
    let outcome: ReportedOutcome = request.outcome.into();
    let session_id = request.session_id;

    let mut sessions = state.sessions().lock().await;
    let mut rooms = state.rooms().lock().await;
    let mut outcomes = state.outcomes().lock().await;

    // Establish the pending record: from the live session when we still
    // have it, else from the caller's opponent hint. The hint path trusts
    // the caller's view of who played; the opponent's own report is the
    // only cross-check.
    if !outcomes.contains(&session_id) {
        if let Some(session) = sessions.get(&session_id) {
            outcomes.insert(PendingOutcome::for_session(session));
        } else if let Some(ref opponent_id) = request.opponent_id {
            warn!(
                session = %session_id,
                caller = %request.user_id,
                "reconstructing pending outcome from caller-supplied opponent"
            );
            outcomes.insert(PendingOutcome::from_hint(
                session_id,
                &request.user_id,
                opponent_id,
                request.is_ranked.unwrap_or(false),
            ));
        }
    }

    let Some(pending) = outcomes.get_mut(&session_id) else {
        return Err(ServiceError::NotFound(format!(
            "no session or outcome record for `{session_id}`"
        )));
    };

    let slot = pending.slot_of(&request.user_id).ok_or_else(|| {
        ServiceError::Forbidden(format!(
            "user `{}` is not a participant of session `{session_id}`",
            request.user_id
        ))
    })?;

    if pending.reported[slot].is_some() {
        return Err(ServiceError::AlreadySubmitted(format!(
            "an outcome is already recorded for `{}` in session `{session_id}`",
            request.user_id
        )));
    }

    pending.reported[slot] = Some(outcome);

    let Some(verdict) = pending.verdict() else {
        debug!(session = %session_id, "first outcome recorded; waiting for peer");
        return Ok(ReportResponse {
            status: ReportStatus::Waiting,
            message: "Report recorded; waiting for your opponent's report".into(),
            updated_score_owner: None,
        });
    };

    // Both reports are in: the session is over no matter how they compare.
    let recorded = pending.clone();

    match verdict {
        Verdict::Conflict => {
            warn!(
                session = %session_id,
                reports = ?recorded.reported,
                "conflicting outcome reports; no score mutation"
            );
            tear_down(&mut sessions, &mut rooms, &mut outcomes, &session_id);
            Ok(ReportResponse {
                status: ReportStatus::Conflict,
                message: "The two reports disagree; no score was changed. \
                          The duel requires manual resolution."
                    .into(),
                updated_score_owner: None,
            })
        }
        Verdict::Draw => {
            tear_down(&mut sessions, &mut rooms, &mut outcomes, &session_id);
            Ok(ReportResponse {
                status: ReportStatus::Draw,
                message: "Draw confirmed; scores are unchanged".into(),
                updated_score_owner: None,
            })
        }
        Verdict::Decisive { winner } => {
            let caller_won = recorded.players[winner] == request.user_id;

            if !recorded.ranked {
                tear_down(&mut sessions, &mut rooms, &mut outcomes, &session_id);
                return Ok(ReportResponse {
                    status: if caller_won {
                        ReportStatus::Win
                    } else {
                        ReportStatus::Loss
                    },
                    message: "Result confirmed; casual duels do not change scores".into(),
                    updated_score_owner: None,
                });
            }

            let elapsed = recorded
                .started_at
                .map(|started| Instant::now().saturating_duration_since(started));
            let (winner_delta, loser_delta) = state.config().scoring.decisive_deltas(elapsed);
            let winner_id = recorded.players[winner].clone();
            let loser_id = recorded.players[1 - winner].clone();

            let write = apply_deltas(state, &winner_id, winner_delta, &loser_id, loser_delta).await;
            tear_down(&mut sessions, &mut rooms, &mut outcomes, &session_id);

            match write {
                Ok(()) => {
                    info!(
                        session = %session_id,
                        winner = %winner_id,
                        winner_delta,
                        loser = %loser_id,
                        loser_delta,
                        "ranked duel finalized"
                    );
                    Ok(ReportResponse {
                        status: if caller_won {
                            ReportStatus::Win
                        } else {
                            ReportStatus::Loss
                        },
                        message: if caller_won {
                            format!("Victory confirmed; you gained {winner_delta} points")
                        } else {
                            format!("Defeat recorded; you lost {} points", -loser_delta)
                        },
                        updated_score_owner: Some(request.user_id),
                    })
                }
                Err((unapplied, err)) => {
                    // A decided reconciliation with a failed score write
                    // must stay visible for manual reconciliation.
                    error!(
                        session = %session_id,
                        winner = %winner_id,
                        winner_delta,
                        loser = %loser_id,
                        loser_delta,
                        reports = ?recorded.reported,
                        unapplied = ?unapplied,
                        error = %err,
                        "score write failed after reconciliation"
                    );
                    Ok(ReportResponse {
                        status: ReportStatus::LedgerFailure,
                        message: "The duel was reconciled but the score update failed; \
                                  it was recorded for manual reconciliation."
                            .into(),
                        updated_score_owner: None,
                    })
                }
            }
        }
    }
}

/// Poll whether a session still awaits reconciliation.
///
/// `resolved` means the session and its pending record are both gone, which
/// is exactly the post-teardown state.
pub async fn status(state: &SharedState, session_id: Uuid) -> ResultStatusResponse {
    let sessions = state.sessions().lock().await;
    let outcomes = state.outcomes().lock().await;

    let waiting = sessions.get(&session_id).is_some() || outcomes.contains(&session_id);
    ResultStatusResponse {
        status: if waiting {
            ResultPollStatus::Waiting
        } else {
            ResultPollStatus::Resolved
        },
    }
}

/// Apply both ledger deltas, reporting which side was left unapplied on
/// failure. The two writes are independent account mutations; a committed
/// winner delta is kept even when the loser write fails.
async fn apply_deltas(
    state: &SharedState,
    winner_id: &str,
    winner_delta: i64,
    loser_id: &str,
    loser_delta: i64,
) -> Result<(), (Unapplied, ServiceError)> {
    let ledger = state
        .require_ledger()
        .await
        .map_err(|err| (Unapplied::Both, err))?;

    if let Err(err) = ledger.apply_delta(winner_id, winner_delta).await {
        return Err((Unapplied::Both, err.into()));
    }
    if let Err(err) = ledger.apply_delta(loser_id, loser_delta).await {
        return Err((Unapplied::Loser, err.into()));
    }
    Ok(())
}

/// Delete the pending outcome, the session, and both reverse mappings as
/// one unit under the registry locks, then let a finished room duel's room
/// revert to a single seat.
fn tear_down(
    sessions: &mut SessionRegistry,
    rooms: &mut RoomRegistry,
    outcomes: &mut OutcomeBoard,
    session_id: &Uuid,
) {
    outcomes.remove(session_id);
    if let Some(session) = sessions.remove(session_id) {
        if matches!(session.origin, SessionOrigin::PrivateRoom) {
            rooms.release_session(session_id);
        }
    }
}
