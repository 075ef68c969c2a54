//! `gagstock on [filters]` / `gagstock off`.

use crate::error::TrackerError;
use crate::tracker::Tracker;

use super::tracker_reply;

pub const STOPPED: &str = "🛑 *Tracking Stopped.*\nYou will no longer receive stock updates.";
pub const NO_ACTIVE_SESSION: &str = "⚠️ *No Active Session.*\nUse 'gagstock on' to start tracking.";
pub const ALREADY_TRACKING: &str =
    "📡 *Already Tracking.*\nA session is already active. Use 'gagstock off' to stop it first.";
pub const USAGE: &str = "📌 *Invalid Usage*\n\nCorrect formats:\n\
     › `gagstock on`\n\
     › `gagstock on Sunflower | Watering Can`\n\
     › `gagstock off`";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GagstockAction {
    /// Start tracking, optionally restricted to items matching `filters`.
    On { filters: Vec<String> },
    Off,
    /// Missing or unrecognised action.
    Usage,
}

impl GagstockAction {
    pub fn parse(args: &[&str]) -> Self {
        match args.first().map(|a| a.to_lowercase()).as_deref() {
            Some("on") => GagstockAction::On {
                filters: parse_filters(&args[1..].join(" ")),
            },
            Some("off") => GagstockAction::Off,
            _ => GagstockAction::Usage,
        }
    }
}

/// Split `raw` on `|` into lowercase filters, dropping empties and repeats.
pub fn parse_filters(raw: &str) -> Vec<String> {
    let mut filters: Vec<String> = Vec::new();
    for filter in raw.split('|').map(|f| f.trim().to_lowercase()) {
        if !filter.is_empty() && !filters.contains(&filter) {
            filters.push(filter);
        }
    }
    filters
}

pub fn started_message(filters: &[String]) -> String {
    if filters.is_empty() {
        "✅ *Tracking Started!*\nYou will now receive live updates for Grow A Garden stock."
            .to_string()
    } else {
        format!(
            "✅ *Tracking Started with Filters!*\nYou'll be notified for changes to: *{}*",
            filters.join(", ")
        )
    }
}

/// Run `action` for `user_id`. Returns the reply to send, if any.
///
/// A successful `on` returns no reply: the greeting is delivered by the
/// session itself so it always precedes the first update.
pub async fn execute(
    tracker: &Tracker,
    user_id: &str,
    action: GagstockAction,
) -> Result<Option<String>, TrackerError> {
    match action {
        GagstockAction::On { filters } => {
            let greeting = started_message(&filters);
            match tracker.start(user_id, filters, Some(greeting)) {
                Ok(session) => {
                    tracing::info!(%user_id, filters = ?session.filters(), "tracking started");
                    Ok(None)
                }
                Err(e) => tracker_reply(e),
            }
        }
        GagstockAction::Off => match tracker.stop(user_id).await {
            Ok(()) => Ok(Some(STOPPED.to_string())),
            Err(e) => tracker_reply(e),
        },
        GagstockAction::Usage => Ok(Some(USAGE.to_string())),
    }
}
