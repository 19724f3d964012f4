//! # Session Store
//!
//! At most one live session per owner. IDLE is represented by absence.
//! Sessions untouched for longer than the idle timeout read back as IDLE.
//! Each owner also has a turn lock so their events are handled one at a time.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Per-owner turn lock
//! - 1.0.0: Initial release

use dashmap::DashMap;
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::Instant;

use super::state::ConversationState;

struct Session {
    state: ConversationState,
    touched: Instant,
}

pub struct SessionStore {
    sessions: DashMap<String, Session>,
    turns: DashMap<String, Arc<Mutex<()>>>,
    idle_timeout: Option<Duration>,
}

impl SessionStore {
    /// `idle_timeout` of `None` keeps sessions until their flow ends
    pub fn new(idle_timeout: Option<Duration>) -> Self {
        Self {
            sessions: DashMap::new(),
            turns: DashMap::new(),
            idle_timeout,
        }
    }

    fn expired(&self, session: &Session) -> bool {
        self.idle_timeout
            .is_some_and(|limit| session.touched.elapsed() > limit)
    }

    /// Wait for the owner's previous event to finish. Hold the guard for
    /// the whole read-state, side effect, write-state sequence.
    pub async fn begin_turn(&self, owner: &str) -> OwnedMutexGuard<()> {
        let turn = self.turns.entry(owner.to_string()).or_default().clone();
        turn.lock_owned().await
    }

    /// Current state, dropping the session if it went stale
    pub fn state(&self, owner: &str) -> ConversationState {
        let stale = match self.sessions.get(owner) {
            Some(session) if !self.expired(&session) => return session.state.clone(),
            Some(_) => true,
            None => false,
        };
        if stale {
            self.sessions.remove(owner);
            debug!("Session for {owner} timed out, back to IDLE");
        }
        ConversationState::Idle
    }

    pub fn set(&self, owner: &str, state: ConversationState) {
        if state.is_idle() {
            self.sessions.remove(owner);
        } else {
            self.sessions.insert(
                owner.to_string(),
                Session {
                    state,
                    touched: Instant::now(),
                },
            );
        }
    }

    /// Drop any in-flight flow. Returns true if one existed.
    pub fn reset(&self, owner: &str) -> bool {
        self.sessions.remove(owner).is_some()
    }

    /// Remove every stale session, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !self.expired(session));
        // Turn locks nobody holds or waits on
        self.turns.retain(|_, turn| Arc::strong_count(turn) > 1);
        before - self.sessions.len()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }
}
