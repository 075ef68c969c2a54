//! Per-user tracking session state.

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use super::fingerprint::LastNotified;

/// Where a session's poll cycle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Fetching,
    Notifying,
    Skipping,
    Waiting,
    Stopped,
}

/// Mutable part of a session, guarded by an async lock so it can be held
/// across a send.
#[derive(Debug, Default)]
pub(crate) struct SessionInner {
    pub(crate) active: bool,
    pub(crate) last_notified: LastNotified,
    /// Cancels the pending wake-up. Present only while waiting.
    pub(crate) wake: Option<CancellationToken>,
}

/// State for one user's active tracking subscription.
#[derive(Debug)]
pub struct Session {
    user_id: String,
    /// Lowercase substrings; empty means "show everything".
    filters: Vec<String>,
    started_at: DateTime<Utc>,
    phase: parking_lot::Mutex<PollState>,
    inner: Mutex<SessionInner>,
}

impl Session {
    pub(crate) fn new(user_id: String, filters: Vec<String>) -> Self {
        Self {
            user_id,
            filters,
            started_at: Utc::now(),
            phase: parking_lot::Mutex::new(PollState::Idle),
            inner: Mutex::new(SessionInner {
                active: true,
                ..SessionInner::default()
            }),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn phase(&self) -> PollState {
        *self.phase.lock()
    }

    pub(crate) fn set_phase(&self, phase: PollState) {
        *self.phase.lock() = phase;
    }

    pub async fn last_notified(&self) -> LastNotified {
        self.inner.lock().await.last_notified.clone()
    }

    /// `false` once the session has been stopped or failed.
    pub async fn is_live(&self) -> bool {
        self.inner.lock().await.active
    }

    /// Whether a wake-up is currently scheduled.
    pub async fn has_pending_wake(&self) -> bool {
        self.inner.lock().await.wake.is_some()
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().await
    }

    /// Deactivate and cancel any pending wake-up.
    ///
    /// Waits for an in-progress send to finish. Returns `false` if the session
    /// was already released, so the handle is never cancelled twice.
    pub(crate) async fn release(&self) -> bool {
        let mut inner = self.inner.lock().await;
        let released = inner.deactivate();
        if released {
            self.set_phase(PollState::Stopped);
        }
        released
    }
}

impl SessionInner {
    pub(crate) fn deactivate(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        if let Some(wake) = self.wake.take() {
            wake.cancel();
        }
        true
    }
}
