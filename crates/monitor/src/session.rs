//! Fetch ordering and refresh serialisation for one monitor session.
//!
//! Every fetch is stamped with a [`Generation`] when it starts. A response
//! may only be applied if it is newer than the last one applied, so a slow
//! response cannot overwrite a fresher one (last fetch wins). Refreshes
//! that drive reconciliation are exclusive: while one is outstanding,
//! another is refused instead of queued.

use std::sync::Mutex;

/// Monotonic stamp taken when a fetch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
struct SessionState {
    issued: u64,
    applied: u64,
    refreshing: bool,
}

#[derive(Debug, Default)]
pub struct SyncSession {
    state: Mutex<SessionState>,
}

impl SyncSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Stamp a new fetch. Later calls always get larger generations.
    pub fn begin_fetch(&self) -> Generation {
        let mut state = self.lock();
        state.issued += 1;
        Generation(state.issued)
    }

    /// Claim the right to apply the response of `generation`.
    ///
    /// Returns `false` (and changes nothing) when a response from the same
    /// or a newer fetch has already been applied.
    pub fn try_apply(&self, generation: Generation) -> bool {
        let mut state = self.lock();
        if generation.0 <= state.applied {
            return false;
        }
        state.applied = generation.0;
        true
    }

    /// Generation of the last applied response, if any.
    pub fn last_applied(&self) -> Option<Generation> {
        let applied = self.lock().applied;
        (applied > 0).then_some(Generation(applied))
    }

    /// Start an exclusive refresh. `None` while another refresh is
    /// outstanding. The refresh ends when the guard is dropped.
    pub fn begin_refresh(&self) -> Option<RefreshGuard<'_>> {
        let mut state = self.lock();
        if state.refreshing {
            return None;
        }
        state.refreshing = true;
        Some(RefreshGuard { session: self })
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }
}

/// Marks a refresh as outstanding for as long as it lives.
#[derive(Debug)]
pub struct RefreshGuard<'a> {
    session: &'a SyncSession,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.session.lock().refreshing = false;
    }
}
