use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::db::DbSettings;
use crate::config::runtime_env::RuntimeEnv;
use crate::db::client::DbClient;
use crate::db::shared_client::ClientRegistry;
use crate::error::AppError;
use crate::state::app_state::AppState;

enum DbSource {
    None,
    Settings(DbSettings),
    Existing(DatabaseConnection),
}

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder<'a> {
    env: RuntimeEnv,
    db: DbSource,
    registry: Option<&'a ClientRegistry>,
}

impl<'a> StateBuilder<'a> {
    pub fn new() -> Self {
        Self {
            env: RuntimeEnv::Dev,
            db: DbSource::None,
            registry: None,
        }
    }

    pub fn with_env(mut self, env: RuntimeEnv) -> Self {
        self.env = env;
        self
    }

    /// Obtain the client for these settings from the registry.
    pub fn with_db(mut self, settings: DbSettings) -> Self {
        self.db = DbSource::Settings(settings);
        self
    }

    /// Wrap an already-open connection, bypassing the registry.
    pub fn with_existing_db(mut self, conn: DatabaseConnection) -> Self {
        self.db = DbSource::Existing(conn);
        self
    }

    /// Use `registry` instead of the process-wide one.
    pub fn with_registry(mut self, registry: &'a ClientRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let env = self.env;
        match self.db {
            DbSource::None => Ok(AppState::without_db(env)),
            DbSource::Existing(conn) => Ok(AppState::new(
                Arc::new(DbClient::from_connection(conn, env)),
                env,
            )),
            DbSource::Settings(settings) => {
                let registry = self.registry.unwrap_or_else(|| ClientRegistry::global());
                let client = registry.get_or_create(env, &settings).await?;
                Ok(AppState::new(client, env))
            }
        }
    }
}

impl Default for StateBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state<'a>() -> StateBuilder<'a> {
    StateBuilder::new()
}
