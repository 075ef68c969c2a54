pub mod graph;

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

pub use graph::GraphMessenger;

#[derive(Debug, thiserror::Error)]
pub enum MessengerError {
    #[error("send request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("send API rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Outbound text channel to a single platform user.
///
/// Delivery is best-effort: callers log failures and carry on.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, user_id: &str, text: &str) -> Result<(), MessengerError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation (for tests)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub user_id: String,
    pub text: String,
}

/// Records every message instead of delivering it.
pub struct MemoryMessenger {
    sent: Mutex<Vec<SentMessage>>,
    tap: Option<mpsc::UnboundedSender<SentMessage>>,
    failing: AtomicBool,
}

impl MemoryMessenger {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            tap: None,
            failing: AtomicBool::new(false),
        }
    }

    /// Also stream each recorded message to the returned receiver.
    pub fn with_tap() -> (Self, mpsc::UnboundedReceiver<SentMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let messenger = Self {
            tap: Some(tx),
            ..Self::new()
        };
        (messenger, rx)
    }

    /// When set, messages are still recorded but `send` reports failure.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    pub fn sent_to(&self, user_id: &str) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.text.clone())
            .collect()
    }
}

impl Default for MemoryMessenger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Messenger for MemoryMessenger {
    async fn send(&self, user_id: &str, text: &str) -> Result<(), MessengerError> {
        let message = SentMessage {
            user_id: user_id.to_string(),
            text: text.to_string(),
        };
        self.sent.lock().push(message.clone());
        if let Some(tap) = &self.tap {
            // The receiver may already be gone.
            let _ = tap.send(message);
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(MessengerError::Rejected {
                status: 503,
                body: "delivery disabled".to_string(),
            });
        }
        Ok(())
    }
}
