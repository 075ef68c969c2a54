pub mod commands;
pub mod config;
pub mod error;
pub mod messenger;
pub mod routes;
pub mod tracker;

use std::sync::Arc;

use config::Config;
use messenger::Messenger;
use tracker::Tracker;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tracker: Arc<Tracker>,
    pub messenger: Arc<dyn Messenger>,
}
