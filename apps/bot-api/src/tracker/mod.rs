//! Per-user stock tracking: sessions, polling and change detection.

pub mod fetcher;
pub mod fingerprint;
pub mod format;
pub mod registry;
pub mod scheduler;
pub mod session;
pub mod snapshot;

use std::sync::Arc;

use gagstock_common::Clock;
use tokio_util::task::TaskTracker;

use crate::error::TrackerError;
use crate::messenger::Messenger;

pub use fetcher::{HttpStockFetcher, StockFetcher};
pub use fingerprint::{Fingerprint, LastNotified};
pub use registry::SessionRegistry;
pub use scheduler::{Cadence, PollScheduler};
pub use session::{PollState, Session};
pub use snapshot::{Category, Item, Snapshot, Weather};

/// Owns the session registry and the poll tasks running against it.
pub struct Tracker {
    registry: Arc<SessionRegistry>,
    scheduler: Arc<PollScheduler>,
    tasks: TaskTracker,
}

impl Tracker {
    pub fn new(
        fetcher: Arc<dyn StockFetcher>,
        messenger: Arc<dyn Messenger>,
        clock: Clock,
        cadence: Cadence,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let scheduler = Arc::new(PollScheduler::new(
            fetcher,
            messenger,
            registry.clone(),
            clock,
            cadence,
        ));
        Self {
            registry,
            scheduler,
            tasks: TaskTracker::new(),
        }
    }

    /// Register a session for `user_id` and start polling for it.
    ///
    /// `greeting` is sent before the first update.
    pub fn start(
        &self,
        user_id: &str,
        filters: Vec<String>,
        greeting: Option<String>,
    ) -> Result<Arc<Session>, TrackerError> {
        let session = self.registry.start(user_id, filters)?;

        let scheduler = self.scheduler.clone();
        let task_session = session.clone();
        self.tasks
            .spawn(async move { scheduler.run(task_session, greeting).await });

        Ok(session)
    }

    pub async fn stop(&self, user_id: &str) -> Result<(), TrackerError> {
        self.registry.stop(user_id).await?;
        tracing::info!(%user_id, "tracking stopped");
        Ok(())
    }

    pub fn is_active(&self, user_id: &str) -> bool {
        self.registry.is_active(user_id)
    }

    pub fn active_sessions(&self) -> usize {
        self.registry.len()
    }

    /// Stop every session and wait for in-flight cycles to finish.
    pub async fn shutdown(&self) {
        let stopped = self.registry.stop_all().await;
        self.tasks.close();
        self.tasks.wait().await;
        tracing::info!(stopped, "tracker shut down");
    }
}
