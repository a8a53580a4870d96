use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tokio::sync::OnceCell as AsyncOnceCell;
use tracing::{debug, info};
use xxhash_rust::xxh3::xxh3_64;

use super::client::DbClient;
use crate::config::db::DbSettings;
use crate::config::runtime_env::RuntimeEnv;
use crate::error::AppError;
use crate::infra::db::build_client;

/// Well-known slot holding the application's client.
pub const DEFAULT_SLOT: &str = "db";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    slot: &'static str,
    db_url_hash: u64,
}

impl SlotKey {
    pub fn new(slot: &'static str, db_url: &str) -> Self {
        Self {
            slot,
            db_url_hash: xxh3_64(db_url.as_bytes()),
        }
    }

    pub fn for_url(db_url: &str) -> Self {
        Self::new(DEFAULT_SLOT, db_url)
    }

    fn log_key(&self) -> String {
        format!("{}:{:x}", self.slot, self.db_url_hash)
    }
}

type Slot = Arc<AsyncOnceCell<Arc<DbClient>>>;

static GLOBAL_REGISTRY: OnceCell<ClientRegistry> = OnceCell::new();

/// Holds at most one client per slot so development rebuilds of the app
/// state keep reusing the same pool.
///
/// Production bypasses the slots entirely: the process builds its client
/// exactly once at startup.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    slots: DashMap<SlotKey, Slot>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used by the server binary.
    pub fn global() -> &'static ClientRegistry {
        GLOBAL_REGISTRY.get_or_init(ClientRegistry::new)
    }

    /// Client for `settings`, built by the default factory on first use.
    pub async fn get_or_create(
        &self,
        env: RuntimeEnv,
        settings: &DbSettings,
    ) -> Result<Arc<DbClient>, AppError> {
        let key = SlotKey::for_url(&settings.url);
        self.get_or_init_with(env, key, move || build_client(env, settings))
            .await
    }

    /// Client stored under `key`, or the one `factory` builds.
    ///
    /// Concurrent first calls for the same key wait on a single build. A
    /// failed build leaves the slot empty so the next call retries.
    pub async fn get_or_init_with<F, Fut>(
        &self,
        env: RuntimeEnv,
        key: SlotKey,
        factory: F,
    ) -> Result<Arc<DbClient>, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<DbClient, AppError>>,
    {
        let log_key = key.log_key();

        if env.is_prod() {
            info!(slot = %log_key, "shared_client=bypass env=prod");
            return factory().await.map(Arc::new);
        }

        // Clone the slot out so no map guard is held across an await
        let slot: Slot = self.slots.entry(key).or_default().value().clone();

        // Fast path: already built
        if let Some(client) = slot.get() {
            debug!(shared_client = "reuse", slot = %log_key, "Reusing shared database client");
            return Ok(client.clone());
        }

        let wait_start = Instant::now();
        let build_key = log_key.clone();
        let client = slot
            .get_or_try_init(move || async move {
                info!(slot = %build_key, "shared_client=about_to_build env=dev");
                factory().await.map(Arc::new)
            })
            .await?;

        let wait_ms = wait_start.elapsed().as_millis();
        debug!(
            shared_client = "ready",
            slot = %log_key,
            wait_ms = wait_ms,
            "Shared database client ready"
        );

        Ok(client.clone())
    }

    /// Client already stored under `key`, if any.
    pub fn get(&self, key: &SlotKey) -> Option<Arc<DbClient>> {
        self.slots.get(key).and_then(|slot| slot.get().cloned())
    }

    /// Number of slots holding a client.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
