#![allow(dead_code)]

use db_supervisor::config::RuntimeEnv;
use db_supervisor::db::DbClient;
use sea_orm::{DatabaseConnection, Statement};

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

pub fn client(conn: DatabaseConnection, env: RuntimeEnv) -> DbClient {
    DbClient::from_connection(conn, env)
}

pub fn select(sql: &str) -> Statement {
    Statement::from_string(sea_orm::DatabaseBackend::Postgres, sql.to_string())
}

/// Value of `key=<digits>` in a captured log line.
pub fn numeric_field(line: &str, key: &str) -> Option<u128> {
    let prefix = format!("{key}=");
    line.split_whitespace()
        .find_map(|token| token.strip_prefix(prefix.as_str()))
        .and_then(|value| value.parse().ok())
}
