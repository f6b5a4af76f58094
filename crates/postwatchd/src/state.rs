//! Application state shared across HTTP handlers

use std::sync::Arc;

use postwatch_store::HistoryStore;

use crate::config::Config;

/// Application state shared across all handlers
pub struct AppState {
    /// Report history persistence
    pub store: HistoryStore,
    /// Daemon configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(store: HistoryStore, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
