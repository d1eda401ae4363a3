// src/session/mod.rs

pub mod controller;
pub mod monitor;

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{error::AppError, session::controller::QuizSession};

/// How long an untouched session (or a finished-session tombstone) is
/// kept before the sweep reclaims it.
pub const SESSION_MAX_IDLE: Duration = Duration::from_secs(2 * 60 * 60);

/// How often the background sweep runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

struct LiveEntry {
    session: Arc<Mutex<QuizSession>>,
    last_seen: Instant,
}

/// Server-side table of live quiz sessions.
///
/// Each session is driven by exactly one student, so contention is only
/// ever between that student's own requests; the per-entry mutex keeps
/// them strictly sequential while distinct sessions never block each
/// other.
///
/// Sessions are discarded as soon as they finish, leaving a tombstone so
/// that late calls still see the terminal state instead of "not found".
/// Abandoned sessions and expired tombstones are reclaimed by a periodic
/// sweep; an abandoned attempt wrote nothing, so losing its entry just
/// means the student starts over.
#[derive(Clone, Default)]
pub struct SessionManager {
    live: Arc<DashMap<Uuid, LiveEntry>>,
    finished: Arc<DashMap<Uuid, Instant>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: QuizSession) -> Uuid {
        let id = session.id();
        self.live.insert(
            id,
            LiveEntry {
                session: Arc::new(Mutex::new(session)),
                last_seen: Instant::now(),
            },
        );
        id
    }

    pub fn get(&self, id: Uuid) -> Result<Arc<Mutex<QuizSession>>, AppError> {
        if let Some(mut entry) = self.live.get_mut(&id) {
            entry.last_seen = Instant::now();
            return Ok(entry.session.clone());
        }
        if self.finished.contains_key(&id) {
            return Err(AppError::SessionAlreadyFinished);
        }
        Err(AppError::NotFound(format!("No session with id {}", id)))
    }

    /// Discards a finished session, keeping only its id as a tombstone.
    /// Callers holding the session's mutex stay valid through their own
    /// `Arc`; the quiz snapshot itself is dropped with the entry.
    pub fn finish(&self, id: Uuid) {
        self.live.remove(&id);
        self.finished.insert(id, Instant::now());
    }

    /// Evicts sessions untouched for longer than `max_idle`, plus expired
    /// tombstones. Returns the number of live sessions reclaimed.
    pub fn sweep(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let before = self.live.len();
        self.live
            .retain(|_, entry| now.duration_since(entry.last_seen) < max_idle);
        self.finished
            .retain(|_, finished_at| now.duration_since(*finished_at) < max_idle);
        before - self.live.len()
    }
}
