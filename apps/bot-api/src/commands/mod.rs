//! Chat command parsing and dispatch.

pub mod gagstock;
pub mod help;

use crate::error::TrackerError;
use crate::AppState;

pub use gagstock::GagstockAction;

/// Optional prefix accepted in front of any command name.
pub const PREFIX: char = '!';

/// Supported chat commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Gagstock(GagstockAction),
}

/// Parse error for an incoming message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("message is empty")]
    Empty,
    #[error("unknown command `{0}`")]
    Unknown(String),
}

/// Parse a message into a command. Matching is case-insensitive.
pub fn parse(text: &str) -> Result<Command, CommandError> {
    let text = text.trim().to_lowercase();
    let mut parts = text.split_whitespace();
    let Some(raw_name) = parts.next() else {
        return Err(CommandError::Empty);
    };
    let name = raw_name.strip_prefix(PREFIX).unwrap_or(raw_name);
    let args: Vec<&str> = parts.collect();

    match name {
        "help" => Ok(Command::Help),
        "gagstock" => Ok(Command::Gagstock(GagstockAction::parse(&args))),
        _ => Err(CommandError::Unknown(name.to_string())),
    }
}

/// Handle one inbound message from `sender_id`, replying through the
/// configured messenger.
pub async fn handle_message(state: &AppState, sender_id: &str, text: &str) {
    let command = match parse(text) {
        Ok(command) => command,
        Err(CommandError::Empty) => {
            tracing::debug!(%sender_id, "ignoring empty message");
            return;
        }
        Err(CommandError::Unknown(name)) => {
            tracing::warn!(%sender_id, command = %name, "unknown command");
            reply(state, sender_id, &unknown_command(&name)).await;
            return;
        }
    };

    tracing::info!(%sender_id, ?command, "executing command");
    let outcome = match command {
        Command::Help => Ok(Some(help::text())),
        Command::Gagstock(action) => gagstock::execute(&state.tracker, sender_id, action).await,
    };

    match outcome {
        Ok(Some(text)) => reply(state, sender_id, &text).await,
        Ok(None) => {}
        Err(e) => {
            tracing::error!(%sender_id, error = %e, "command failed");
            reply(state, sender_id, GENERIC_ERROR).await;
        }
    }
}

const GENERIC_ERROR: &str = "❌ An error occurred while processing your request.";

fn unknown_command(name: &str) -> String {
    format!("❓ Sorry, I don't recognize the command \"{name}\".")
}

async fn reply(state: &AppState, sender_id: &str, text: &str) {
    if let Err(e) = state.messenger.send(sender_id, text).await {
        tracing::warn!(%sender_id, error = %e, "reply delivery failed");
    }
}

/// Map tracker errors a command can recover from into replies.
fn tracker_reply(err: TrackerError) -> Result<Option<String>, TrackerError> {
    match err {
        TrackerError::AlreadyActive => Ok(Some(gagstock::ALREADY_TRACKING.to_string())),
        TrackerError::NotActive => Ok(Some(gagstock::NO_ACTIVE_SESSION.to_string())),
        other => Err(other),
    }
}
