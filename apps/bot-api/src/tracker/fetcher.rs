//! Upstream stock + weather reads.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TrackerError;

use super::snapshot::Snapshot;

/// Source of stock snapshots.
#[async_trait]
pub trait StockFetcher: Send + Sync {
    /// Read both sources and return one validated snapshot. Any failure is
    /// `FetchFailed`; partial snapshots are never returned.
    async fn fetch(&self) -> Result<Snapshot, TrackerError>;
}

/// Reads the two JSON endpoints concurrently over HTTP.
#[derive(Clone)]
pub struct HttpStockFetcher {
    stock_url: String,
    weather_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl HttpStockFetcher {
    pub fn new(stock_url: &str, weather_url: &str, timeout: Duration) -> Self {
        Self {
            stock_url: stock_url.to_string(),
            weather_url: weather_url.to_string(),
            timeout,
            http: reqwest::Client::new(),
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value, TrackerError> {
        let request = async {
            let value = self
                .http
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .json::<Value>()
                .await?;
            Ok::<_, reqwest::Error>(value)
        };

        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(%url, error = %e, "upstream read failed");
                Err(TrackerError::FetchFailed(format!("{url}: {e}")))
            }
            Err(_) => {
                tracing::warn!(%url, timeout_ms = self.timeout.as_millis() as u64, "upstream read timed out");
                Err(TrackerError::FetchFailed(format!(
                    "{url}: timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

#[async_trait]
impl StockFetcher for HttpStockFetcher {
    async fn fetch(&self) -> Result<Snapshot, TrackerError> {
        let (stock, weather) = futures_util::future::try_join(
            self.get_json(&self.stock_url),
            self.get_json(&self.weather_url),
        )
        .await?;

        Snapshot::from_payloads(&stock, &weather)
    }
}
