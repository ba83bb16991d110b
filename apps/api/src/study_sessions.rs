//! # Study Session Registry
//!
//! Running study sessions live here, in memory only. Nothing a session does
//! is written to the database.
//!
//! ## Thread Safety
//! The map is wrapped in `Arc<Mutex<T>>`. Each request locks, applies one
//! engine operation, and releases, so input for a session is applied in
//! arrival order.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Study Session Lifecycle                              │
//! │                                                                         │
//! │  POST /decks/{id}/study ──► start() ───► replace same-deck, insert(uuid)│
//! │                                                                         │
//! │  GET /study/{sid} ────────► view() ────► (read, touches last_seen)      │
//! │                                                                         │
//! │  POST /study/{sid}/actions ► apply() ──► session.apply(action)          │
//! │                                                                         │
//! │  DELETE /study/{sid} ─────► finish() ──► entries.remove(uuid)           │
//! │                                                                         │
//! │  background sweep ────────► purge_expired() ─► drop idle entries        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Limits
//! A user has at most one session per deck; starting again replaces the
//! old one. Across decks a user keeps at most [`MAX_SESSIONS_PER_USER`],
//! after which the least recently used one is dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;
use uuid::Uuid;

use flashdeck_core::{StudySession, StudyView, Transition};

/// Live sessions one user may hold across all their decks.
pub const MAX_SESSIONS_PER_USER: usize = 20;

type Entries = HashMap<Uuid, StudyEntry>;

struct StudyEntry {
    user_id: String,
    deck_id: i64,
    deck_title: String,
    session: StudySession,
    last_seen: Instant,
}

impl StudyEntry {
    fn snapshot(&self, session_id: Uuid) -> StudySnapshot {
        StudySnapshot {
            session_id,
            deck_id: self.deck_id,
            deck_title: self.deck_title.clone(),
            view: self.session.snapshot(),
        }
    }
}

/// A session's view plus the deck it came from.
#[derive(Debug, Clone, Serialize)]
pub struct StudySnapshot {
    pub session_id: Uuid,
    pub deck_id: i64,
    pub deck_title: String,
    #[serde(flatten)]
    pub view: StudyView,
}

/// Shared registry of running sessions, keyed by session id.
///
/// A session is only visible to the user who started it; for anyone else
/// it doesn't exist.
#[derive(Clone)]
pub struct StudySessions {
    entries: Arc<Mutex<Entries>>,
    idle_timeout: Duration,
}

impl StudySessions {
    pub fn new(idle_timeout: Duration) -> Self {
        StudySessions {
            entries: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        // Every operation leaves the map consistent, so a poisoned lock is still usable
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new session and returns its first view.
    ///
    /// Any session the user already had on this deck is discarded.
    pub fn start(
        &self,
        user_id: &str,
        deck_id: i64,
        deck_title: &str,
        session: StudySession,
    ) -> StudySnapshot {
        let session_id = Uuid::new_v4();
        let entry = StudyEntry {
            user_id: user_id.to_string(),
            deck_id,
            deck_title: deck_title.to_string(),
            session,
            last_seen: Instant::now(),
        };
        let snapshot = entry.snapshot(session_id);

        let mut entries = self.lock();

        let before = entries.len();
        entries.retain(|_, e| !(e.user_id == user_id && e.deck_id == deck_id));
        if entries.len() < before {
            tracing::debug!(deck_id, user_id, "Previous study session on this deck replaced");
        }

        let mut owned: Vec<(Uuid, Instant)> = entries
            .iter()
            .filter(|(_, e)| e.user_id == user_id)
            .map(|(id, e)| (*id, e.last_seen))
            .collect();
        if owned.len() >= MAX_SESSIONS_PER_USER {
            owned.sort_by_key(|(_, last_seen)| *last_seen);
            let excess = owned.len() + 1 - MAX_SESSIONS_PER_USER;
            for (evicted, _) in owned.into_iter().take(excess) {
                entries.remove(&evicted);
                tracing::debug!(session_id = %evicted, user_id, "Study session evicted, too many open");
            }
        }

        entries.insert(session_id, entry);
        tracing::debug!(%session_id, deck_id, user_id, "Study session started");

        snapshot
    }

    /// Looks up a live session owned by `user_id` in an already locked map.
    ///
    /// An idle session found here is removed and reported as absent.
    fn live_entry<'a>(
        &self,
        entries: &'a mut Entries,
        session_id: Uuid,
        user_id: &str,
    ) -> Option<&'a mut StudyEntry> {
        let now = Instant::now();

        let expired = match entries.get(&session_id) {
            None => return None,
            Some(entry) if entry.user_id != user_id => return None,
            Some(entry) => now.duration_since(entry.last_seen) > self.idle_timeout,
        };
        if expired {
            entries.remove(&session_id);
            tracing::debug!(%session_id, "Study session expired");
            return None;
        }

        entries.get_mut(&session_id).map(|entry| {
            entry.last_seen = now;
            entry
        })
    }

    /// Runs `f` against a live session owned by `user_id`.
    fn with_entry<R>(
        &self,
        session_id: Uuid,
        user_id: &str,
        f: impl FnOnce(&mut StudyEntry) -> R,
    ) -> Option<R> {
        let mut entries = self.lock();
        self.live_entry(&mut entries, session_id, user_id).map(f)
    }

    /// Current view of a session.
    pub fn view(&self, session_id: Uuid, user_id: &str) -> Option<StudySnapshot> {
        self.with_entry(session_id, user_id, |entry| entry.snapshot(session_id))
    }

    /// Applies one engine operation and returns the outcome with the new view.
    pub fn apply<F>(
        &self,
        session_id: Uuid,
        user_id: &str,
        operation: F,
    ) -> Option<(Transition, StudySnapshot)>
    where
        F: FnOnce(&mut StudySession) -> Transition,
    {
        self.with_entry(session_id, user_id, |entry| {
            let transition = operation(&mut entry.session);
            (transition, entry.snapshot(session_id))
        })
    }

    /// Discards a session, returning the deck to go back to.
    pub fn finish(&self, session_id: Uuid, user_id: &str) -> Option<i64> {
        let mut entries = self.lock();
        let deck_id = self.live_entry(&mut entries, session_id, user_id)?.deck_id;
        entries.remove(&session_id);
        tracing::debug!(%session_id, deck_id, "Study session finished");
        Some(deck_id)
    }

    /// Drops every session idle for longer than the timeout.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.last_seen) <= self.idle_timeout);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
