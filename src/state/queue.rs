//! Public matchmaking queue holding users waiting for an opponent.

use std::time::{Duration, Instant};

use indexmap::IndexMap;

use crate::state::session::{DuelMode, PlayerRef};

/// A user waiting in the public queue.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    /// Waiting player.
    pub player: PlayerRef,
    /// Partition the player wants to be matched in.
    pub mode: DuelMode,
    /// When the entry was enqueued, for staleness eviction.
    pub enqueued_at: Instant,
}

/// Result of a join attempt.
#[derive(Debug)]
pub enum JoinOutcome {
    /// No compatible opponent was waiting; the caller is now queued.
    Queued,
    /// The caller was already queued; nothing changed.
    AlreadyQueued,
    /// A compatible opponent was found and atomically removed from the
    /// queue. The caller was never enqueued.
    Matched(QueueEntry),
}

/// FIFO queue keyed by user id, partitioned by mode at match time.
///
/// The insertion order of the underlying map is the arrival order, so the
/// first compatible entry found is the longest-waiting one.
#[derive(Debug, Default)]
pub struct MatchQueue {
    entries: IndexMap<String, QueueEntry>,
}

impl MatchQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Evict entries that have been waiting longer than `ttl`, returning the
    /// number of evicted entries. The queue is best effort beyond that
    /// window.
    pub fn evict_stale(&mut self, now: Instant, ttl: Duration) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.enqueued_at) < ttl);
        before - self.entries.len()
    }

    /// Attempt to match `player` against the longest-waiting compatible
    /// entry, enqueueing the player when none is found.
    ///
    /// A matched entry is removed before this call returns, so no concurrent
    /// join observing the queue under the same lock can match it twice.
    pub fn join(&mut self, player: PlayerRef, mode: DuelMode, now: Instant) -> JoinOutcome {
        if self.entries.contains_key(&player.user_id) {
            return JoinOutcome::AlreadyQueued;
        }

        let waiting = self
            .entries
            .iter()
            .find(|(user_id, entry)| entry.mode == mode && user_id.as_str() != player.user_id)
            .map(|(user_id, _)| user_id.clone());

        if let Some(user_id) = waiting {
            if let Some(entry) = self.entries.shift_remove(&user_id) {
                return JoinOutcome::Matched(entry);
            }
        }

        self.entries.insert(
            player.user_id.clone(),
            QueueEntry {
                player,
                mode,
                enqueued_at: now,
            },
        );
        JoinOutcome::Queued
    }

    /// Remove a user from the queue; `false` when the user was not waiting.
    ///
    /// Leaving after being consumed by a match is expected and not an error.
    pub fn leave(&mut self, user_id: &str) -> bool {
        self.entries.shift_remove(user_id).is_some()
    }

    /// Whether the user is currently waiting.
    pub fn contains(&self, user_id: &str) -> bool {
        self.entries.contains_key(user_id)
    }

    /// Number of waiting users.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nobody is waiting.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
