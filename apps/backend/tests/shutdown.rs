//! Disconnect paths of the shutdown controller.

mod common;

use std::sync::Arc;

use backend_test_support::log_capture;
use backend_test_support::mock_db::empty_connection;
use common::client;
use db_supervisor::config::RuntimeEnv;
use db_supervisor::db::LifecycleState;
use db_supervisor::lifecycle::{ShutdownController, ShutdownSignal};
use sea_orm::DatabaseConnection;

fn controller(conn: DatabaseConnection, env: RuntimeEnv) -> ShutdownController {
    ShutdownController::new(Arc::new(client(conn, env)))
}

#[tokio::test]
async fn two_sequential_signals_disconnect_once() {
    let (logs, _guard) = log_capture::capture();
    let shutdown = controller(empty_connection(), RuntimeEnv::Dev);

    shutdown.on_signal(ShutdownSignal::Interrupt).await;
    shutdown.on_signal(ShutdownSignal::Terminate).await;

    assert_eq!(shutdown.client().lifecycle(), LifecycleState::Disconnected);
    assert!(logs.contains("Received SIGINT"));
    assert!(logs.contains("Received SIGTERM"));
    assert_eq!(logs.matching(&["db_client=disconnected"]).len(), 1);
}

#[tokio::test]
async fn overlapping_triggers_are_tolerated() {
    let shutdown = controller(empty_connection(), RuntimeEnv::Dev);

    tokio::join!(
        shutdown.on_signal(ShutdownSignal::Terminate),
        shutdown.before_exit(),
        shutdown.on_signal(ShutdownSignal::Interrupt),
    );

    assert_eq!(shutdown.client().lifecycle(), LifecycleState::Disconnected);
}

#[tokio::test]
async fn before_exit_is_logged_in_dev_only() {
    let (logs, _guard) = log_capture::capture();

    controller(empty_connection(), RuntimeEnv::Dev)
        .before_exit()
        .await;
    assert!(logs.contains("db_lifecycle=before_exit"));

    logs.clear();
    let prod = controller(empty_connection(), RuntimeEnv::Prod);
    prod.before_exit().await;
    assert!(!logs.contains("db_lifecycle=before_exit"));
    assert_eq!(prod.client().lifecycle(), LifecycleState::Disconnected);
}

#[tokio::test]
async fn close_failure_is_logged_not_raised() {
    let (logs, _guard) = log_capture::capture();
    // Closing an already-disconnected connection fails inside the ORM
    let shutdown = controller(DatabaseConnection::Disconnected, RuntimeEnv::Prod);

    shutdown.on_signal(ShutdownSignal::Terminate).await;
    shutdown.on_signal(ShutdownSignal::Terminate).await;

    assert_eq!(shutdown.client().lifecycle(), LifecycleState::Disconnected);
    let failures = logs.matching(&["ERROR", "db_client=disconnect_failed"]);
    assert_eq!(failures.len(), 1);
}

#[tokio::test]
async fn disconnect_after_real_pool_use() {
    use db_supervisor::config::DbSettings;
    use db_supervisor::infra::db::build_client;
    use sea_orm::ConnectionTrait;

    let settings = DbSettings::new("sqlite::memory:", RuntimeEnv::Dev);
    let client = Arc::new(build_client(RuntimeEnv::Dev, &settings).await.unwrap());
    client.execute_unprepared("SELECT 1").await.unwrap();

    let shutdown = ShutdownController::new(client.clone());
    shutdown.on_signal(ShutdownSignal::Interrupt).await;
    shutdown.before_exit().await;

    assert_eq!(client.lifecycle(), LifecycleState::Disconnected);
    assert!(client.execute_unprepared("SELECT 1").await.is_err());
}

#[tokio::test]
async fn in_flight_work_finishes_before_pool_closes() {
    use std::time::Duration;

    use db_supervisor::config::DbSettings;
    use db_supervisor::infra::db::build_client;
    use sea_orm::ConnectionTrait;
    use tokio::sync::oneshot;

    let (logs, _guard) = log_capture::capture();
    let settings = DbSettings::new("sqlite::memory:", RuntimeEnv::Dev);
    let client = Arc::new(build_client(RuntimeEnv::Dev, &settings).await.unwrap());
    let shutdown = ShutdownController::new(client.clone());

    let (done_tx, done_rx) = oneshot::channel();
    // Stands in for the server draining a request that lands after the signal
    let request = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let result = client.execute_unprepared("SELECT 1").await;
        let _ = done_tx.send(());
        result
    };
    let drain = async {
        let _ = done_rx.await;
    };

    let (result, ()) = tokio::join!(
        request,
        shutdown.on_signal_after(ShutdownSignal::Terminate, drain)
    );

    assert!(result.is_ok(), "request during drain failed: {result:?}");
    assert_eq!(client.lifecycle(), LifecycleState::Disconnected);

    let lines = logs.lines();
    let received = lines.iter().position(|l| l.contains("Received SIGTERM"));
    let closed = lines.iter().position(|l| l.contains("db_client=disconnected"));
    assert!(received.is_some() && closed.is_some());
    assert!(received < closed);
}
