//! End-to-end coordinator scenarios driven through the service layer with an
//! in-process score ledger.

use std::{
    sync::Arc,
    time::{Duration, Instant, SystemTime},
};

use uuid::Uuid;

use duelhub_back::{
    config::AppConfig,
    dao::{
        ledger::{PlayerProfile, ScoreLedger},
        memory::InMemoryLedger,
    },
    dto::{
        matchmaking::{DuelModeDto, DuelStatus, JoinQueueRequest, LeaveQueueRequest, PlayerInput, SearchStatus},
        result::{OutcomeDto, ReportRequest, ReportStatus, ResultPollStatus},
        room::{CreateRoomRequest, JoinRoomRequest, LeaveRoomRequest, RoomStatus},
    },
    error::ServiceError,
    services::{health_service, matchmaking_service, result_service, room_service, video},
    state::{
        AppState, SharedState,
        session::{DuelMode, DuelSession, PlayerRef, SessionOrigin},
    },
};

async fn setup() -> (SharedState, InMemoryLedger) {
    let state = AppState::new(AppConfig::default());
    let ledger = InMemoryLedger::new();
    state.install_ledger(Arc::new(ledger.clone())).await;
    (state, ledger)
}

fn input(id: &str) -> PlayerInput {
    PlayerInput {
        user_id: id.into(),
        display_name: id.to_uppercase(),
    }
}

fn seed(ledger: &InMemoryLedger, id: &str, score: i64) {
    ledger.insert(PlayerProfile {
        user_id: id.into(),
        display_name: id.to_uppercase(),
        score,
    });
}

async fn score_of(ledger: &InMemoryLedger, id: &str) -> i64 {
    ledger.fetch(id).await.unwrap().map(|p| p.score).unwrap_or(0)
}

fn report(user: &str, session_id: Uuid, outcome: OutcomeDto) -> ReportRequest {
    ReportRequest {
        user_id: user.into(),
        session_id,
        outcome,
        opponent_id: None,
        is_ranked: None,
    }
}

/// Register a ranked session directly, optionally backdating its start.
async fn register_session(state: &SharedState, a: &str, b: &str, age: Duration) -> Uuid {
    let id = Uuid::new_v4();
    let started_at = Instant::now()
        .checked_sub(age)
        .expect("monotonic clock too young to backdate");
    let session = DuelSession {
        id,
        mode: DuelMode::Ranked,
        participants: [
            PlayerRef {
                user_id: a.into(),
                display_name: a.to_uppercase(),
            },
            PlayerRef {
                user_id: b.into(),
                display_name: b.to_uppercase(),
            },
        ],
        channel_id: video::session_channel(&id),
        origin: SessionOrigin::Queue,
        created_at: SystemTime::now(),
        started_at,
    };
    state.sessions().lock().await.register(session);
    id
}

#[tokio::test]
async fn ranked_queue_flow_matches_scores_and_tears_down() {
    let (state, ledger) = setup().await;
    seed(&ledger, "ada", 50);
    seed(&ledger, "bob", 50);

    let first = matchmaking_service::join(
        &state,
        JoinQueueRequest {
            user: input("ada"),
            mode: DuelModeDto::Ranked,
        },
    )
    .await
    .unwrap();
    assert_eq!(first.status, SearchStatus::Searching);

    // Bob's join completes the pair, but still answers `searching`; the
    // match is discovered by polling.
    let second = matchmaking_service::join(
        &state,
        JoinQueueRequest {
            user: input("bob"),
            mode: DuelModeDto::Ranked,
        },
    )
    .await
    .unwrap();
    assert_eq!(second.status, SearchStatus::Searching);

    let ada_status = matchmaking_service::status(&state, "ada").await;
    let bob_status = matchmaking_service::status(&state, "bob").await;
    assert_eq!(ada_status.status, DuelStatus::Matched);
    assert_eq!(bob_status.status, DuelStatus::Matched);

    let ada_game = ada_status.game.expect("ada should see the session");
    let bob_game = bob_status.game.expect("bob should see the session");
    assert_eq!(ada_game.session_id, bob_game.session_id);
    assert_eq!(ada_game.opponent.unwrap().user_id, "bob");
    assert_eq!(bob_game.opponent.unwrap().user_id, "ada");

    let session_id = ada_game.session_id;

    let waiting = result_service::report(&state, report("ada", session_id, OutcomeDto::Win))
        .await
        .unwrap();
    assert_eq!(waiting.status, ReportStatus::Waiting);
    assert_eq!(
        result_service::status(&state, session_id).await.status,
        ResultPollStatus::Waiting
    );

    let final_report = result_service::report(&state, report("bob", session_id, OutcomeDto::Loss))
        .await
        .unwrap();
    assert_eq!(final_report.status, ReportStatus::Loss);
    assert_eq!(final_report.updated_score_owner.as_deref(), Some("bob"));

    // Base win/loss magnitudes; the duel was too short for any bonus.
    assert_eq!(score_of(&ledger, "ada").await, 60);
    assert_eq!(score_of(&ledger, "bob").await, 45);

    // Session, mappings, and pending outcome are gone.
    assert_eq!(
        matchmaking_service::status(&state, "ada").await.status,
        DuelStatus::Idle
    );
    assert_eq!(
        matchmaking_service::status(&state, "bob").await.status,
        DuelStatus::Idle
    );
    assert_eq!(
        result_service::status(&state, session_id).await.status,
        ResultPollStatus::Resolved
    );

    // Re-reporting against the dead session is rejected outright.
    let err = result_service::report(&state, report("ada", session_id, OutcomeDto::Win))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn duration_bonus_is_granted_beyond_the_floor() {
    let (state, ledger) = setup().await;
    seed(&ledger, "ada", 50);
    seed(&ledger, "bob", 20);

    // Six minutes elapsed: one full bonus step past the five minute floor.
    let session_id = register_session(&state, "ada", "bob", Duration::from_secs(361)).await;

    result_service::report(&state, report("bob", session_id, OutcomeDto::Loss))
        .await
        .unwrap();
    let response = result_service::report(&state, report("ada", session_id, OutcomeDto::Win))
        .await
        .unwrap();

    assert_eq!(response.status, ReportStatus::Win);
    assert_eq!(score_of(&ledger, "ada").await, 61);
    assert_eq!(score_of(&ledger, "bob").await, 15);
}

#[tokio::test]
async fn draw_reports_leave_scores_untouched() {
    let (state, ledger) = setup().await;
    seed(&ledger, "ada", 50);
    seed(&ledger, "bob", 50);

    let session_id = register_session(&state, "ada", "bob", Duration::ZERO).await;

    result_service::report(&state, report("ada", session_id, OutcomeDto::Draw))
        .await
        .unwrap();
    let response = result_service::report(&state, report("bob", session_id, OutcomeDto::Draw))
        .await
        .unwrap();

    assert_eq!(response.status, ReportStatus::Draw);
    assert_eq!(score_of(&ledger, "ada").await, 50);
    assert_eq!(score_of(&ledger, "bob").await, 50);
}

#[tokio::test]
async fn conflicting_reports_tear_down_without_scoring() {
    let (state, ledger) = setup().await;
    seed(&ledger, "ada", 50);
    seed(&ledger, "bob", 50);

    let session_id = register_session(&state, "ada", "bob", Duration::ZERO).await;

    result_service::report(&state, report("ada", session_id, OutcomeDto::Win))
        .await
        .unwrap();
    let response = result_service::report(&state, report("bob", session_id, OutcomeDto::Win))
        .await
        .unwrap();

    assert_eq!(response.status, ReportStatus::Conflict);
    assert_eq!(score_of(&ledger, "ada").await, 50);
    assert_eq!(score_of(&ledger, "bob").await, 50);

    // The session is over regardless of the dispute.
    assert_eq!(
        result_service::status(&state, session_id).await.status,
        ResultPollStatus::Resolved
    );
    assert_eq!(
        matchmaking_service::status(&state, "ada").await.status,
        DuelStatus::Idle
    );
}

#[tokio::test]
async fn resubmission_by_the_same_participant_is_rejected() {
    let (state, _ledger) = setup().await;
    let session_id = register_session(&state, "ada", "bob", Duration::ZERO).await;

    result_service::report(&state, report("ada", session_id, OutcomeDto::Win))
        .await
        .unwrap();
    let err = result_service::report(&state, report("ada", session_id, OutcomeDto::Win))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::AlreadySubmitted(_)));

    // The peer can still conclude the duel.
    let response = result_service::report(&state, report("bob", session_id, OutcomeDto::Loss))
        .await
        .unwrap();
    assert_eq!(response.status, ReportStatus::Loss);
}

#[tokio::test]
async fn outsiders_cannot_report() {
    let (state, _ledger) = setup().await;
    let session_id = register_session(&state, "ada", "bob", Duration::ZERO).await;

    let err = result_service::report(&state, report("eve", session_id, OutcomeDto::Win))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[tokio::test]
async fn pending_outcome_is_reconstructed_from_the_opponent_hint() {
    let (state, ledger) = setup().await;
    seed(&ledger, "ada", 10);

    // The server never knew this session; only the caller's hint remains.
    let session_id = Uuid::new_v4();
    let first = result_service::report(
        &state,
        ReportRequest {
            user_id: "ada".into(),
            session_id,
            outcome: OutcomeDto::Win,
            opponent_id: Some("bob".into()),
            is_ranked: Some(true),
        },
    )
    .await
    .unwrap();
    assert_eq!(first.status, ReportStatus::Waiting);

    let second = result_service::report(&state, report("bob", session_id, OutcomeDto::Loss))
        .await
        .unwrap();
    assert_eq!(second.status, ReportStatus::Loss);

    // No start time survived, so no bonus; bob is clamped at zero.
    assert_eq!(score_of(&ledger, "ada").await, 20);
    assert_eq!(score_of(&ledger, "bob").await, 0);
}

#[tokio::test]
async fn report_without_session_or_hint_is_not_found() {
    let (state, _ledger) = setup().await;
    let err = result_service::report(&state, report("ada", Uuid::new_v4(), OutcomeDto::Win))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn room_lifecycle_creator_leave_destroys_everything() {
    let (state, _ledger) = setup().await;

    let created = room_service::create(
        &state,
        CreateRoomRequest {
            user: input("carol"),
            room_id: Some("abc123".into()),
        },
    )
    .await
    .unwrap();
    assert_eq!(created.status, RoomStatus::Waiting);
    assert_eq!(created.room_id, "ABC123");
    assert_eq!(created.channel_id, video::room_channel("ABC123"));

    let joined = room_service::join(
        &state,
        JoinRoomRequest {
            user: input("judy"),
            room_id: "ABC123".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(joined.status, RoomStatus::Ready);
    assert_eq!(joined.opponent, "CAROL");

    // Both now occupy a room-origin session.
    let judy_status = matchmaking_service::status(&state, "judy").await;
    assert_eq!(judy_status.status, DuelStatus::Ready);
    let session_id = judy_status.game.unwrap().session_id;

    room_service::leave(
        &state,
        LeaveRoomRequest {
            user_id: "carol".into(),
        },
    )
    .await;

    // Room, session, and both mappings are gone.
    let poll = room_service::status(&state, "judy", "ABC123").await.unwrap();
    assert_eq!(poll.status, RoomStatus::NotFound);
    assert_eq!(
        matchmaking_service::status(&state, "judy").await.status,
        DuelStatus::Idle
    );
    assert_eq!(
        result_service::status(&state, session_id).await.status,
        ResultPollStatus::Resolved
    );
}

#[tokio::test]
async fn challenger_leave_reverts_the_room_and_voids_the_duel() {
    let (state, _ledger) = setup().await;

    room_service::create(
        &state,
        CreateRoomRequest {
            user: input("carol"),
            room_id: Some("ABC123".into()),
        },
    )
    .await
    .unwrap();
    room_service::join(
        &state,
        JoinRoomRequest {
            user: input("judy"),
            room_id: "ABC123".into(),
        },
    )
    .await
    .unwrap();

    room_service::leave(
        &state,
        LeaveRoomRequest {
            user_id: "judy".into(),
        },
    )
    .await;

    // Carol keeps the room, open for a new opponent; judy is free again.
    let poll = room_service::status(&state, "carol", "ABC123").await.unwrap();
    assert_eq!(poll.status, RoomStatus::Waiting);
    assert_eq!(poll.is_creator, Some(true));

    let rejoin = matchmaking_service::join(
        &state,
        JoinQueueRequest {
            user: input("judy"),
            mode: DuelModeDto::Casual,
        },
    )
    .await
    .unwrap();
    assert_eq!(rejoin.status, SearchStatus::Searching);
}

#[tokio::test]
async fn room_duels_never_touch_the_ledger() {
    let (state, ledger) = setup().await;
    seed(&ledger, "carol", 30);
    seed(&ledger, "judy", 30);

    room_service::create(
        &state,
        CreateRoomRequest {
            user: input("carol"),
            room_id: Some("DUEL42".into()),
        },
    )
    .await
    .unwrap();
    room_service::join(
        &state,
        JoinRoomRequest {
            user: input("judy"),
            room_id: "duel42".into(),
        },
    )
    .await
    .unwrap();

    let session_id = matchmaking_service::status(&state, "judy")
        .await
        .game
        .unwrap()
        .session_id;

    result_service::report(&state, report("carol", session_id, OutcomeDto::Win))
        .await
        .unwrap();
    let response = result_service::report(&state, report("judy", session_id, OutcomeDto::Loss))
        .await
        .unwrap();

    assert_eq!(response.status, ReportStatus::Loss);
    assert!(response.updated_score_owner.is_none());
    assert_eq!(score_of(&ledger, "carol").await, 30);
    assert_eq!(score_of(&ledger, "judy").await, 30);

    // The finished room reverts to a single seat for a rematch.
    let poll = room_service::status(&state, "carol", "DUEL42").await.unwrap();
    assert_eq!(poll.status, RoomStatus::Waiting);
}

#[tokio::test]
async fn busy_users_cannot_enter_a_second_pairing_flow() {
    let (state, _ledger) = setup().await;

    matchmaking_service::join(
        &state,
        JoinQueueRequest {
            user: input("ada"),
            mode: DuelModeDto::Ranked,
        },
    )
    .await
    .unwrap();

    // Queue join is idempotent rather than an error.
    let again = matchmaking_service::join(
        &state,
        JoinQueueRequest {
            user: input("ada"),
            mode: DuelModeDto::Ranked,
        },
    )
    .await
    .unwrap();
    assert_eq!(again.status, SearchStatus::AlreadySearching);

    // Room creation is a hard error for a queued user.
    let err = room_service::create(
        &state,
        CreateRoomRequest {
            user: input("ada"),
            room_id: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyBusy(_)));

    // Leaving the queue frees the user again.
    matchmaking_service::leave(
        &state,
        LeaveQueueRequest {
            user_id: "ada".into(),
        },
    )
    .await;
    assert_eq!(
        matchmaking_service::status(&state, "ada").await.status,
        DuelStatus::Idle
    );
    assert!(
        room_service::create(
            &state,
            CreateRoomRequest {
                user: input("ada"),
                room_id: None,
            },
        )
        .await
        .is_ok()
    );
}

#[tokio::test]
async fn modes_never_cross_match() {
    let (state, _ledger) = setup().await;

    matchmaking_service::join(
        &state,
        JoinQueueRequest {
            user: input("ada"),
            mode: DuelModeDto::Ranked,
        },
    )
    .await
    .unwrap();
    matchmaking_service::join(
        &state,
        JoinQueueRequest {
            user: input("bob"),
            mode: DuelModeDto::Casual,
        },
    )
    .await
    .unwrap();

    assert_eq!(
        matchmaking_service::status(&state, "ada").await.status,
        DuelStatus::Searching
    );
    assert_eq!(
        matchmaking_service::status(&state, "bob").await.status,
        DuelStatus::Searching
    );
}

#[tokio::test]
async fn health_reflects_ledger_availability() {
    let (state, _ledger) = setup().await;
    let watcher = state.degraded_watcher();

    assert_eq!(health_service::health_status(&state).await.status, "ok");
    assert!(!*watcher.borrow());

    state.clear_ledger().await;
    assert_eq!(
        health_service::health_status(&state).await.status,
        "degraded"
    );
}

#[tokio::test]
async fn degraded_ranked_finalization_is_surfaced_as_ledger_failure() {
    // No ledger installed: the coordinator still reconciles and tears down,
    // but surfaces the failed score write distinctly.
    let state = AppState::new(AppConfig::default());
    let session_id = register_session(&state, "ada", "bob", Duration::ZERO).await;

    result_service::report(&state, report("ada", session_id, OutcomeDto::Win))
        .await
        .unwrap();
    let response = result_service::report(&state, report("bob", session_id, OutcomeDto::Loss))
        .await
        .unwrap();

    assert_eq!(response.status, ReportStatus::LedgerFailure);
    assert!(response.updated_score_owner.is_none());
    assert_eq!(
        result_service::status(&state, session_id).await.status,
        ResultPollStatus::Resolved
    );
}
