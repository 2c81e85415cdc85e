//! Pending outcome table and the pure reconciliation rules: classification
//! of the two per-player reports and ranked score deltas.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use uuid::Uuid;

use crate::state::session::DuelSession;

/// Result a player claims for a finished duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportedOutcome {
    /// The reporting player claims victory.
    Win,
    /// The reporting player concedes defeat.
    Loss,
    /// The reporting player claims a draw.
    Draw,
}

/// Agreement classification of the two reports of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Exactly one win facing the other side's loss.
    Decisive {
        /// Slot (0 or 1) of the winning participant.
        winner: usize,
    },
    /// Both sides reported a draw.
    Draw,
    /// Any other combination; scores stay untouched and the session is over.
    Conflict,
}

/// Classify a pair of reports, `first` being slot 0 and `second` slot 1.
pub fn classify(first: ReportedOutcome, second: ReportedOutcome) -> Verdict {
    use ReportedOutcome::{Draw, Loss, Win};
    match (first, second) {
        (Win, Loss) => Verdict::Decisive { winner: 0 },
        (Loss, Win) => Verdict::Decisive { winner: 1 },
        (Draw, Draw) => Verdict::Draw,
        _ => Verdict::Conflict,
    }
}

/// Scoring constants applied to ranked decisive results.
#[derive(Debug, Clone)]
pub struct ScoringRules {
    /// Points awarded to the winner before any bonus.
    pub win_points: i64,
    /// Points (positive magnitude) removed from the loser.
    pub loss_points: i64,
    /// Duel duration below or at which no bonus accrues.
    pub bonus_floor_secs: u64,
    /// Size of one bonus accrual step beyond the floor.
    pub bonus_step_secs: u64,
    /// Points granted per full step.
    pub bonus_step_points: i64,
    /// Ceiling the bonus never exceeds, regardless of duel age.
    pub bonus_cap: i64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            win_points: 10,
            loss_points: 5,
            bonus_floor_secs: 300,
            bonus_step_secs: 60,
            bonus_step_points: 1,
            bonus_cap: 5,
        }
    }
}

impl ScoringRules {
    /// Duration bonus for the winner: zero at or below the floor, then one
    /// increment per full step, capped.
    pub fn duration_bonus(&self, elapsed: Duration) -> i64 {
        let secs = elapsed.as_secs();
        if secs <= self.bonus_floor_secs || self.bonus_step_secs == 0 {
            return 0;
        }
        let steps = (secs - self.bonus_floor_secs) / self.bonus_step_secs;
        (steps as i64 * self.bonus_step_points).min(self.bonus_cap)
    }

    /// (winner delta, loser delta) for a ranked decisive result.
    ///
    /// `elapsed` is `None` for sessions reconstructed without a start time;
    /// those accrue no bonus.
    pub fn decisive_deltas(&self, elapsed: Option<Duration>) -> (i64, i64) {
        let bonus = elapsed.map_or(0, |e| self.duration_bonus(e));
        (self.win_points + bonus, -self.loss_points)
    }
}

/// Accumulated per-session reports, keyed by participant slot.
#[derive(Debug, Clone)]
pub struct PendingOutcome {
    /// Session the reports belong to.
    pub session_id: Uuid,
    /// Canonical participant user ids, in session order.
    pub players: [String; 2],
    /// Outcome recorded for each slot, if submitted.
    pub reported: [Option<ReportedOutcome>; 2],
    /// Whether a decisive result mutates the score ledger.
    pub ranked: bool,
    /// Monotonic duel start, when the live session was still known.
    pub started_at: Option<Instant>,
}

impl PendingOutcome {
    /// Seed a pending outcome from a live session.
    pub fn for_session(session: &DuelSession) -> Self {
        Self {
            session_id: session.id,
            players: [
                session.participants[0].user_id.clone(),
                session.participants[1].user_id.clone(),
            ],
            reported: [None, None],
            ranked: matches!(session.mode, crate::state::session::DuelMode::Ranked),
            started_at: Some(session.started_at),
        }
    }

    /// Reconstruct a pending outcome for a session the server no longer
    /// knows, from the caller's view of who played.
    ///
    /// The opponent identity is taken on the caller's word alone; the
    /// opponent's own report is the only cross-check. Duration is unknown,
    /// so no bonus will accrue.
    pub fn from_hint(session_id: Uuid, caller_id: &str, opponent_id: &str, ranked: bool) -> Self {
        Self {
            session_id,
            players: [caller_id.to_owned(), opponent_id.to_owned()],
            reported: [None, None],
            ranked,
            started_at: None,
        }
    }

    /// Slot index of `user_id` among the participants.
    pub fn slot_of(&self, user_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p == user_id)
    }

    /// Classification of the two reports once both are present.
    pub fn verdict(&self) -> Option<Verdict> {
        match (self.reported[0], self.reported[1]) {
            (Some(first), Some(second)) => Some(classify(first, second)),
            _ => None,
        }
    }
}

/// Table of pending outcomes, keyed by session id.
#[derive(Debug, Default)]
pub struct OutcomeBoard {
    pending: HashMap<Uuid, PendingOutcome>,
}

impl OutcomeBoard {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a pending outcome exists for the session.
    pub fn contains(&self, session_id: &Uuid) -> bool {
        self.pending.contains_key(session_id)
    }

    /// Insert a pending outcome, replacing none.
    pub fn insert(&mut self, outcome: PendingOutcome) {
        self.pending.entry(outcome.session_id).or_insert(outcome);
    }

    /// Mutable access to a session's pending outcome.
    pub fn get_mut(&mut self, session_id: &Uuid) -> Option<&mut PendingOutcome> {
        self.pending.get_mut(session_id)
    }

    /// Drop a session's pending outcome, if any.
    pub fn remove(&mut self, session_id: &Uuid) -> Option<PendingOutcome> {
        self.pending.remove(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_table() {
        use ReportedOutcome::{Draw, Loss, Win};

        assert_eq!(classify(Win, Loss), Verdict::Decisive { winner: 0 });
        assert_eq!(classify(Loss, Win), Verdict::Decisive { winner: 1 });
        assert_eq!(classify(Draw, Draw), Verdict::Draw);

        // Every other combination is a conflict.
        for pair in [
            (Win, Win),
            (Loss, Loss),
            (Win, Draw),
            (Draw, Win),
            (Loss, Draw),
            (Draw, Loss),
        ] {
            assert_eq!(classify(pair.0, pair.1), Verdict::Conflict, "{pair:?}");
        }
    }

    #[test]
    fn bonus_is_zero_below_the_floor() {
        let rules = ScoringRules::default();
        assert_eq!(rules.duration_bonus(Duration::from_secs(0)), 0);
        assert_eq!(rules.duration_bonus(Duration::from_secs(299)), 0);
        assert_eq!(rules.duration_bonus(Duration::from_secs(300)), 0);
    }

    #[test]
    fn bonus_accrues_in_full_steps() {
        let rules = ScoringRules::default();
        // 6 minutes: one full step past the 5 minute floor.
        assert_eq!(rules.duration_bonus(Duration::from_secs(360)), 1);
        // A partial step does not count.
        assert_eq!(rules.duration_bonus(Duration::from_secs(359)), 0);
        assert_eq!(rules.duration_bonus(Duration::from_secs(420)), 2);
    }

    #[test]
    fn bonus_never_exceeds_the_cap() {
        let rules = ScoringRules::default();
        assert_eq!(rules.duration_bonus(Duration::from_secs(3600)), 5);
        assert_eq!(rules.duration_bonus(Duration::from_secs(86_400)), 5);
    }

    #[test]
    fn deltas_for_a_six_minute_duel() {
        let rules = ScoringRules::default();
        let (winner, loser) = rules.decisive_deltas(Some(Duration::from_secs(360)));
        assert_eq!(winner, 11);
        assert_eq!(loser, -5);
    }

    #[test]
    fn reconstructed_outcomes_accrue_no_bonus() {
        let rules = ScoringRules::default();
        let (winner, loser) = rules.decisive_deltas(None);
        assert_eq!(winner, 10);
        assert_eq!(loser, -5);
    }

    #[test]
    fn hint_reconstruction_orders_caller_first() {
        let session_id = Uuid::new_v4();
        let pending = PendingOutcome::from_hint(session_id, "ada", "bob", true);
        assert_eq!(pending.slot_of("ada"), Some(0));
        assert_eq!(pending.slot_of("bob"), Some(1));
        assert_eq!(pending.slot_of("eve"), None);
        assert!(pending.started_at.is_none());
    }

    #[test]
    fn verdict_requires_both_reports() {
        let mut pending = PendingOutcome::from_hint(Uuid::new_v4(), "ada", "bob", true);
        assert!(pending.verdict().is_none());
        pending.reported[0] = Some(ReportedOutcome::Win);
        assert!(pending.verdict().is_none());
        pending.reported[1] = Some(ReportedOutcome::Loss);
        assert_eq!(pending.verdict(), Some(Verdict::Decisive { winner: 0 }));
    }
}
