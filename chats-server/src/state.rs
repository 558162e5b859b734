//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::db::sqlite::SqliteStore;
use crate::views::Views;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Chat record store, opened once at startup.
    pub store: Arc<SqliteStore>,
    /// Compiled page templates.
    pub views: Arc<Views>,
}

#[cfg(test)]
impl AppState {
    /// State backed by a fresh in-memory store and default configuration.
    pub async fn for_tests() -> Arc<Self> {
        let mut config = Config::from_env();
        config.database_url = "sqlite::memory:".to_owned();
        config.static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/public").to_owned();
        let store = SqliteStore::connect(&config.database_url)
            .await
            .expect("in-memory store");
        Arc::new(Self {
            config: Arc::new(config),
            store: Arc::new(store),
            views: Arc::new(Views::new().expect("templates compile")),
        })
    }
}
