#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod db;
pub mod error;
pub mod infra;
pub mod lifecycle;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-exports for public API
pub use config::{ClientOptions, DbSettings, RuntimeEnv};
pub use db::{ClientRegistry, DbClient, LifecycleState, Operation, ResultShape};
pub use error::AppError;
pub use infra::db::build_client;
pub use lifecycle::{ShutdownController, ShutdownSignal};
pub use middleware::request_log::RequestLog;
pub use state::app_state::AppState;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::logging::init();
}
