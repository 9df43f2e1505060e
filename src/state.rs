use crate::config::AppConfig;
use crate::database::DatabaseManager;
use std::sync::Arc;

/// Shared handler state: the connection pool wrapper plus runtime config.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Arc<DatabaseManager>, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }
}
