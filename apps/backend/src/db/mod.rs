pub mod client;
pub mod interceptor;
pub mod lifecycle;
pub mod shared_client;

use std::sync::Arc;

pub use client::DbClient;
pub use interceptor::{OpInterceptor, Operation, ResultShape, ResultSize};
pub use lifecycle::LifecycleState;
pub use shared_client::{ClientRegistry, SlotKey};

use crate::error::AppError;
use crate::state::app_state::AppState;

/// Centralized helper to access the database client from AppState.
///
/// Returns `AppError::DbUnavailable` when the state was built without a database.
pub fn require_db(state: &AppState) -> Result<&Arc<DbClient>, AppError> {
    state.db().ok_or_else(AppError::db_unavailable)
}
