//! Singleton behaviour of the client registry.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use backend_test_support::mock_db::empty_connection;
use common::client;
use db_supervisor::config::{DbSettings, RuntimeEnv};
use db_supervisor::db::{ClientRegistry, SlotKey};
use db_supervisor::error::AppError;

fn sqlite_settings(env: RuntimeEnv) -> DbSettings {
    DbSettings::new("sqlite::memory:", env)
}

#[tokio::test]
async fn dev_requests_return_identical_handle() {
    let registry = ClientRegistry::new();
    let settings = sqlite_settings(RuntimeEnv::Dev);

    let first = registry.get_or_create(RuntimeEnv::Dev, &settings).await.unwrap();
    let second = registry.get_or_create(RuntimeEnv::Dev, &settings).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.len(), 1);

    let stored = registry.get(&SlotKey::for_url(&settings.url)).unwrap();
    assert!(Arc::ptr_eq(&first, &stored));
}

#[tokio::test]
async fn prod_bypasses_the_slot() {
    let registry = ClientRegistry::new();
    let settings = sqlite_settings(RuntimeEnv::Prod);

    let first = registry.get_or_create(RuntimeEnv::Prod, &settings).await.unwrap();
    let second = registry.get_or_create(RuntimeEnv::Prod, &settings).await.unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(registry.is_empty());
    assert!(registry.get(&SlotKey::for_url(&settings.url)).is_none());
}

#[tokio::test]
async fn failed_build_leaves_slot_empty_for_retry() {
    let registry = ClientRegistry::new();
    let key = SlotKey::new("flaky", "mock://flaky");
    let attempts = AtomicUsize::new(0);
    let attempts = &attempts;

    let err = registry
        .get_or_init_with(RuntimeEnv::Dev, key.clone(), || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(AppError::config("first attempt fails"))
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Config { .. }));
    assert!(registry.is_empty());

    let built = registry
        .get_or_init_with(RuntimeEnv::Dev, key.clone(), || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Ok(client(empty_connection(), RuntimeEnv::Dev))
        })
        .await
        .unwrap();

    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert!(Arc::ptr_eq(&built, &registry.get(&key).unwrap()));
}

#[tokio::test]
async fn separate_slots_hold_separate_clients() {
    let registry = ClientRegistry::new();

    let primary = registry
        .get_or_init_with(RuntimeEnv::Dev, SlotKey::for_url("mock://a"), || async {
            Ok(client(empty_connection(), RuntimeEnv::Dev))
        })
        .await
        .unwrap();
    let replica = registry
        .get_or_init_with(RuntimeEnv::Dev, SlotKey::new("replica", "mock://a"), || async {
            Ok(client(empty_connection(), RuntimeEnv::Dev))
        })
        .await
        .unwrap();

    assert!(!Arc::ptr_eq(&primary, &replica));
    assert_eq!(registry.len(), 2);
}

#[tokio::test]
async fn global_registry_is_process_wide() {
    assert!(std::ptr::eq(ClientRegistry::global(), ClientRegistry::global()));

    let settings = sqlite_settings(RuntimeEnv::Dev);
    let first = ClientRegistry::global()
        .get_or_create(RuntimeEnv::Dev, &settings)
        .await
        .unwrap();
    let second = ClientRegistry::global()
        .get_or_create(RuntimeEnv::Dev, &settings)
        .await
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}
