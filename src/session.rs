//! Per-player session state.
//!
//! Each session owns the free-spin counter and bonus flag for one player's
//! play session. Counters reset only on an explicit restart, never
//! silently. The per-session lock is what serializes two in-flight spins
//! from the same player.

use crate::engine::types::{Amount, SpinPhase};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Mutable state private to one player's session.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub free_spins_remaining: u32,
    /// Stake replayed by granted free spins.
    pub free_spin_stake: Amount,
    /// Set for one display cycle after a bonus round.
    pub bonus_active: bool,
    pub phase: SpinPhase,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            free_spins_remaining: 0,
            free_spin_stake: 0,
            bonus_active: false,
            phase: SpinPhase::Idle,
        }
    }
}

/// Handle to one live session: lockable state plus a liveness flag checked
/// before any queued free spin is consumed.
#[derive(Debug)]
pub struct SessionHandle {
    pub state: Mutex<SessionState>,
    live: AtomicBool,
}

impl SessionHandle {
    fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            live: AtomicBool::new(true),
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

/// Registry of sessions, one per player id.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: DashMap<String, Arc<SessionHandle>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the player's session, creating a live one on first use.
    pub fn session(&self, player_id: &str) -> Arc<SessionHandle> {
        self.sessions
            .entry(player_id.to_string())
            .or_insert_with(|| Arc::new(SessionHandle::new()))
            .clone()
    }

    /// Close the player's session. Pending free-spin chains observe the
    /// flag and stop before consuming another spin.
    pub fn close(&self, player_id: &str) {
        if let Some(handle) = self.sessions.get(player_id) {
            handle.close();
            info!(player_id, "session closed");
        }
    }

    /// Explicit game restart: drop the old session entirely so the next
    /// spin starts from a fresh, live state.
    pub fn restart(&self, player_id: &str) {
        if let Some((_, handle)) = self.sessions.remove(player_id) {
            handle.close();
        }
        info!(player_id, "session restarted");
    }

    pub fn is_live(&self, player_id: &str) -> bool {
        self.sessions
            .get(player_id)
            .map(|handle| handle.is_live())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
