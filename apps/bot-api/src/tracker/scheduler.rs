//! Per-session fetch → compare → notify → wait loop.

use std::sync::Arc;
use std::time::Duration;

use gagstock_common::{Clock, RestockTimers};
use tokio_util::sync::CancellationToken;

use crate::messenger::Messenger;

use super::fetcher::StockFetcher;
use super::fingerprint::{Fingerprint, LastNotified};
use super::format::{self, Rendered};
use super::registry::SessionRegistry;
use super::session::{PollState, Session};

/// Shortest wait between two cycles of one session.
const MIN_WAIT: Duration = Duration::from_secs(1);

/// Wall-clock cadence for poll cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub interval_secs: u32,
    /// Seconds past each boundary, so the upstream has refreshed first.
    pub offset_secs: u32,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            offset_secs: 15,
        }
    }
}

enum Next {
    Wait,
    Stop,
}

/// Drives every session's poll cycle.
///
/// A session's next wake-up is scheduled only after its current cycle has
/// finished, so at most one fetch per session is ever in flight.
pub struct PollScheduler {
    fetcher: Arc<dyn StockFetcher>,
    messenger: Arc<dyn Messenger>,
    registry: Arc<SessionRegistry>,
    clock: Clock,
    cadence: Cadence,
}

impl PollScheduler {
    pub fn new(
        fetcher: Arc<dyn StockFetcher>,
        messenger: Arc<dyn Messenger>,
        registry: Arc<SessionRegistry>,
        clock: Clock,
        cadence: Cadence,
    ) -> Self {
        Self {
            fetcher,
            messenger,
            registry,
            clock,
            cadence,
        }
    }

    /// Run `session` until it is stopped or its fetch fails.
    ///
    /// `greeting` is delivered before the first cycle.
    pub async fn run(&self, session: Arc<Session>, greeting: Option<String>) {
        let user_id = session.user_id().to_string();
        tracing::info!(%user_id, filters = ?session.filters(), "tracking session started");

        if let Some(text) = greeting {
            let inner = session.lock().await;
            if inner.active {
                self.deliver(&user_id, &text).await;
            }
        }

        loop {
            if let Next::Stop = self.cycle(&session).await {
                break;
            }
            if !self.wait(&session).await {
                break;
            }
        }

        session.set_phase(PollState::Stopped);
        let tracked_secs = (chrono::Utc::now() - session.started_at()).num_seconds();
        tracing::info!(%user_id, tracked_secs, "tracking session ended");
    }

    async fn cycle(&self, session: &Arc<Session>) -> Next {
        let user_id = session.user_id();
        session.set_phase(PollState::Fetching);
        tracing::debug!(%user_id, "fetching stock");

        // The fetch is never interrupted by stop; its result is checked below.
        let result = self.fetcher.fetch().await;

        let mut inner = session.lock().await;
        if !inner.active {
            tracing::debug!(%user_id, "session stopped during fetch, discarding result");
            return Next::Stop;
        }

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(%user_id, error = %e, "stock fetch failed, stopping session");
                inner.deactivate();
                session.set_phase(PollState::Stopped);
                // The session stays registered until its notice is out, so a
                // restart cannot greet the user ahead of it.
                self.deliver(user_id, &format::failure_notice()).await;
                self.registry.evict(session);
                return Next::Stop;
            }
        };

        let fingerprint = Fingerprint::of(&snapshot);
        if !inner.last_notified.has_changed(&fingerprint) {
            session.set_phase(PollState::Skipping);
            tracing::info!(%user_id, "no changes detected, skipping notification");
            return Next::Wait;
        }

        let now = self.clock.now();
        let timers = RestockTimers::at(&now);
        match format::render(&snapshot, session.filters(), &timers, &now) {
            Rendered::NoMatch(text) => {
                // Identical empty snapshots were already skipped above.
                inner.last_notified = LastNotified::NoMatchNotice(fingerprint);
                session.set_phase(PollState::Notifying);
                self.deliver(user_id, &text).await;
                tracing::info!(%user_id, "no filter matches, notice sent");
            }
            Rendered::Update(text) => {
                // Recorded before sending: a failed delivery is not retried.
                inner.last_notified = LastNotified::Update(fingerprint);
                session.set_phase(PollState::Notifying);
                self.deliver(user_id, &text).await;
                tracing::info!(%user_id, "update sent");
            }
        }
        drop(inner);

        Next::Wait
    }

    /// Sleep until the next cadence boundary. Returns `false` if the session
    /// was stopped before or during the wait.
    async fn wait(&self, session: &Session) -> bool {
        let next = self
            .clock
            .next_aligned(self.cadence.interval_secs, self.cadence.offset_secs);
        let delay = self.clock.until(&next).max(MIN_WAIT);

        let wake = CancellationToken::new();
        {
            let mut inner = session.lock().await;
            if !inner.active {
                return false;
            }
            inner.wake = Some(wake.clone());
        }
        session.set_phase(PollState::Waiting);
        tracing::info!(
            user_id = %session.user_id(),
            wait_secs = delay.as_secs(),
            next = %next.format("%H:%M:%S"),
            "scheduled next check"
        );

        let fired = tokio::select! {
            _ = tokio::time::sleep(delay) => true,
            _ = wake.cancelled() => false,
        };

        let mut inner = session.lock().await;
        inner.wake = None;
        fired && inner.active
    }

    async fn deliver(&self, user_id: &str, text: &str) {
        if let Err(e) = self.messenger.send(user_id, text).await {
            tracing::warn!(%user_id, error = %e, "notification delivery failed");
        }
    }
}
