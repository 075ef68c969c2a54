#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use tokio::sync::{mpsc, Notify};

use bot_api::config::Config;
use bot_api::error::TrackerError;
use bot_api::messenger::{MemoryMessenger, SentMessage};
use bot_api::tracker::{Cadence, Category, Item, Snapshot, StockFetcher, Tracker, Weather};
use bot_api::AppState;
use gagstock_common::Clock;

pub const VERIFY_TOKEN: &str = "test-verify-token";

/// Returns queued results in order, repeating the last one forever.
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<Result<Snapshot, TrackerError>>>,
    last: Mutex<Option<Result<Snapshot, TrackerError>>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(script: Vec<Result<Snapshot, TrackerError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn always(snapshot: Snapshot) -> Arc<Self> {
        Self::new(vec![Ok(snapshot)])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StockFetcher for ScriptedFetcher {
    async fn fetch(&self) -> Result<Snapshot, TrackerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().pop_front();
        let mut last = self.last.lock();
        if let Some(result) = next {
            *last = Some(result);
        }
        last.clone()
            .unwrap_or_else(|| Err(TrackerError::FetchFailed("empty script".to_string())))
    }
}

/// Blocks every fetch until released, announcing when one has started.
pub struct GatedFetcher {
    snapshot: Snapshot,
    started: mpsc::UnboundedSender<()>,
    release: Notify,
}

impl GatedFetcher {
    pub fn new(snapshot: Snapshot) -> (Arc<Self>, mpsc::UnboundedReceiver<()>) {
        let (started, rx) = mpsc::unbounded_channel();
        let fetcher = Arc::new(Self {
            snapshot,
            started,
            release: Notify::new(),
        });
        (fetcher, rx)
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl StockFetcher for GatedFetcher {
    async fn fetch(&self) -> Result<Snapshot, TrackerError> {
        let _ = self.started.send(());
        self.release.notified().await;
        Ok(self.snapshot.clone())
    }
}

/// Snapshot with the given seeds and a fixed weather.
pub fn seeds(items: &[(&str, u64)]) -> Snapshot {
    Snapshot::new(
        [(
            Category::Seed,
            items.iter().map(|(name, qty)| Item::new(*name, *qty)).collect(),
        )],
        Weather::new("Sunny"),
    )
}

/// Clock pinned to 12:07:00 Asia/Manila, so every wait is 195 seconds.
pub fn frozen_clock() -> Clock {
    Clock::frozen(
        chrono_tz::Asia::Manila,
        Utc.with_ymd_and_hms(2025, 6, 1, 4, 7, 0).unwrap(),
    )
}

pub fn test_tracker(
    fetcher: Arc<dyn StockFetcher>,
) -> (Arc<Tracker>, Arc<MemoryMessenger>, mpsc::UnboundedReceiver<SentMessage>) {
    let (messenger, rx) = MemoryMessenger::with_tap();
    let messenger = Arc::new(messenger);
    let tracker = Arc::new(Tracker::new(
        fetcher,
        messenger.clone(),
        frozen_clock(),
        Cadence::default(),
    ));
    (tracker, messenger, rx)
}

pub fn test_config() -> Config {
    Config {
        port: 0,
        verify_token: VERIFY_TOKEN.to_string(),
        page_access_token: "test-page-token".to_string(),
        graph_api_url: "http://127.0.0.1:9".to_string(),
        stock_api_url: "http://127.0.0.1:9/stock".to_string(),
        weather_api_url: "http://127.0.0.1:9/weather".to_string(),
        timezone: chrono_tz::Asia::Manila,
        poll_interval_secs: 300,
        poll_offset_secs: 15,
        fetch_timeout: Duration::from_secs(1),
        typing_delay: Duration::ZERO,
    }
}

pub struct TestContext {
    pub state: AppState,
    pub messenger: Arc<MemoryMessenger>,
    pub outbox: mpsc::UnboundedReceiver<SentMessage>,
}

/// Build a test AppState with an in-memory messenger and the given fetcher.
pub fn test_state(fetcher: Arc<dyn StockFetcher>) -> TestContext {
    let (tracker, messenger, outbox) = test_tracker(fetcher);
    let state = AppState {
        config: Arc::new(test_config()),
        tracker,
        messenger: messenger.clone(),
    };
    TestContext {
        state,
        messenger,
        outbox,
    }
}

/// Build the full application router wired to the test state.
pub fn test_app(fetcher: Arc<dyn StockFetcher>) -> (Router, TestContext) {
    let ctx = test_state(fetcher);
    let app = bot_api::routes::router().with_state(ctx.state.clone());
    (app, ctx)
}

/// Wait for the next outbound message, failing the test after five seconds.
pub async fn next_message(outbox: &mut mpsc::UnboundedReceiver<SentMessage>) -> SentMessage {
    next_message_within(outbox, Duration::from_secs(5)).await
}

/// Like `next_message`, with a caller-chosen limit. Tests on paused time
/// need a limit longer than one poll wait.
pub async fn next_message_within(
    outbox: &mut mpsc::UnboundedReceiver<SentMessage>,
    limit: Duration,
) -> SentMessage {
    tokio::time::timeout(limit, outbox.recv())
        .await
        .expect("timed out waiting for a message")
        .expect("messenger dropped")
}

/// Messenger webhook payload carrying one text message.
pub fn text_event(sender_id: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "object": "page",
        "entry": [{
            "messaging": [{
                "sender": { "id": sender_id },
                "recipient": { "id": "page" },
                "message": { "mid": "m_1", "text": text }
            }]
        }]
    })
}
