use std::sync::Arc;

use crate::config::runtime_env::RuntimeEnv;
use crate::db::client::DbClient;

/// Application state containing shared resources
#[derive(Debug, Clone)]
pub struct AppState {
    /// Shared database client (absent for tests that never touch the database)
    pub db: Option<Arc<DbClient>>,
    /// Runtime mode the process was started in
    pub env: RuntimeEnv,
}

impl AppState {
    /// Create a new AppState around the shared client
    pub fn new(db: Arc<DbClient>, env: RuntimeEnv) -> Self {
        Self { db: Some(db), env }
    }

    /// Create a new AppState without a database client
    pub fn without_db(env: RuntimeEnv) -> Self {
        Self { db: None, env }
    }

    pub fn db(&self) -> Option<&Arc<DbClient>> {
        self.db.as_ref()
    }
}
