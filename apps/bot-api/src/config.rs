use std::time::Duration;

use chrono_tz::Tz;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env vars: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("{name} has an invalid value `{value}`")]
    Invalid { name: &'static str, value: String },
}

/// Bot configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Token the platform echoes back during webhook subscription.
    pub verify_token: String,
    /// Page access token for the Send API.
    pub page_access_token: String,
    /// Send API base (e.g. `https://graph.facebook.com/v15.0`).
    pub graph_api_url: String,
    /// Upstream endpoint returning the five stock categories.
    pub stock_api_url: String,
    /// Upstream endpoint returning the current weather.
    pub weather_api_url: String,
    /// Zone every cadence boundary is computed in.
    pub timezone: Tz,
    /// Seconds between polls, aligned to wall-clock boundaries.
    pub poll_interval_secs: u32,
    /// Seconds after each boundary to poll, so upstream has refreshed first.
    pub poll_offset_secs: u32,
    /// Timeout for each upstream read.
    pub fetch_timeout: Duration,
    /// Pause between the typing indicator and the message.
    pub typing_delay: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// All missing required variables are reported together.
    pub fn from_env() -> Result<Self, ConfigError> {
        let verify_token = optional_var("VERIFY_TOKEN");
        let page_access_token = optional_var("PAGE_ACCESS_TOKEN");

        let mut missing = Vec::new();
        if page_access_token.is_none() {
            missing.push("PAGE_ACCESS_TOKEN");
        }
        if verify_token.is_none() {
            missing.push("VERIFY_TOKEN");
        }
        let (Some(verify_token), Some(page_access_token)) = (verify_token, page_access_token) else {
            return Err(ConfigError::Missing(missing));
        };

        let timezone = match optional_var("TRACKER_TIMEZONE") {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| ConfigError::Invalid {
                    name: "TRACKER_TIMEZONE",
                    value: name.clone(),
                })?,
            None => chrono_tz::Asia::Manila,
        };

        Ok(Self {
            port: parsed_var("PORT", 3000)?,
            verify_token,
            page_access_token,
            graph_api_url: optional_var("GRAPH_API_URL")
                .unwrap_or_else(|| "https://graph.facebook.com/v15.0".to_string()),
            stock_api_url: optional_var("STOCK_API_URL")
                .unwrap_or_else(|| "https://gagstock.gleeze.com/grow-a-garden".to_string()),
            weather_api_url: optional_var("WEATHER_API_URL")
                .unwrap_or_else(|| "https://growagardenstock.com/api/stock/weather".to_string()),
            timezone,
            poll_interval_secs: parsed_var("POLL_INTERVAL_SECS", 300)?,
            poll_offset_secs: parsed_var("POLL_OFFSET_SECS", 15)?,
            fetch_timeout: Duration::from_secs(parsed_var("FETCH_TIMEOUT_SECS", 8)?),
            typing_delay: Duration::from_millis(parsed_var("TYPING_DELAY_MS", 500)?),
        })
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional_var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
