//! Builders for sea-orm mock connections.

use std::collections::BTreeMap;

use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult, Value};

/// Mock connection that returns one result set of `rows` rows, each `{ id }`.
pub fn rows_connection(rows: usize) -> DatabaseConnection {
    let result_set: Vec<BTreeMap<&str, Value>> = (0..rows)
        .map(|i| BTreeMap::from([("id", Value::BigInt(Some(i as i64)))]))
        .collect();

    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([result_set])
        .into_connection()
}

/// Mock connection whose next statement execution affects `rows_affected` rows.
pub fn exec_connection(rows_affected: u64) -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }])
        .into_connection()
}

/// Mock connection whose next query fails with `DbErr::Custom(message)`.
pub fn failing_query_connection(message: &str) -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom(message.to_string())])
        .into_connection()
}

/// Mock connection with no queued results.
pub fn empty_connection() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}
