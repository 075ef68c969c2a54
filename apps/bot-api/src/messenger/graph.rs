//! Send API client for delivering text messages to page users.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Messenger, MessengerError};

/// Per-request timeout for Send API calls.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct GraphMessenger {
    base_url: String,
    access_token: String,
    typing_delay: Duration,
    http: reqwest::Client,
}

impl GraphMessenger {
    pub fn new(base_url: &str, access_token: &str, typing_delay: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            typing_delay,
            http: reqwest::Client::builder()
                .timeout(SEND_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    async fn post(&self, body: &Value) -> Result<(), MessengerError> {
        let url = format!("{}/me/messages", self.base_url);
        let resp = self
            .http
            .post(&url)
            .query(&[("access_token", self.access_token.as_str())])
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        // The Graph API puts the useful detail under `error`.
        let text = resp.text().await.unwrap_or_default();
        let body = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v.get("error").map(Value::to_string))
            .unwrap_or(text);
        Err(MessengerError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    async fn typing(&self, user_id: &str, on: bool) {
        let action = if on { "typing_on" } else { "typing_off" };
        let body = json!({
            "recipient": { "id": user_id },
            "sender_action": action,
        });
        if let Err(e) = self.post(&body).await {
            tracing::debug!(%user_id, %action, error = %e, "sender action failed");
        }
    }
}

#[async_trait]
impl Messenger for GraphMessenger {
    async fn send(&self, user_id: &str, text: &str) -> Result<(), MessengerError> {
        self.typing(user_id, true).await;
        if !self.typing_delay.is_zero() {
            tokio::time::sleep(self.typing_delay).await;
        }

        let body = json!({
            "recipient": { "id": user_id },
            "message": { "text": text },
        });
        let result = self.post(&body).await;
        if let Err(e) = &result {
            tracing::error!(%user_id, error = %e, "failed to send message");
        }

        self.typing(user_id, false).await;
        result
    }
}
