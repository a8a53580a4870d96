use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, ExecResult, QueryResult,
    Statement,
};
use tracing::{debug, error, info};

use super::interceptor::{OpInterceptor, Operation, ResultShape};
use super::lifecycle::{Lifecycle, LifecycleState};
use crate::config::client::{ClientOptions, ErrorFormat};
use crate::config::runtime_env::RuntimeEnv;

/// Shared database client handle.
///
/// Every operation issued through the handle is timed and logged by its
/// [`OpInterceptor`]. Raw statements go through the [`ConnectionTrait`] impl,
/// entity-level calls through [`DbClient::run`].
pub struct DbClient {
    conn: Arc<DatabaseConnection>,
    backend: Option<DatabaseBackend>,
    env: RuntimeEnv,
    options: ClientOptions,
    interceptor: OpInterceptor,
    lifecycle: Lifecycle,
}

impl DbClient {
    pub fn new(conn: DatabaseConnection, env: RuntimeEnv, options: ClientOptions) -> Self {
        let interceptor = OpInterceptor::new(env, options.error_format);
        let backend = match &conn {
            DatabaseConnection::Disconnected => None,
            live => Some(live.get_database_backend()),
        };
        Self {
            conn: Arc::new(conn),
            backend,
            env,
            options,
            interceptor,
            lifecycle: Lifecycle::new(),
        }
    }

    /// Wrap an existing connection with the default options for `env`.
    pub fn from_connection(conn: DatabaseConnection, env: RuntimeEnv) -> Self {
        Self::new(conn, env, ClientOptions::for_env(env))
    }

    pub fn env(&self) -> RuntimeEnv {
        self.env
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Underlying connection. Calls made on it directly bypass the interceptor.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Run an operation against the pool with timing and logging.
    ///
    /// ```ignore
    /// let active = client
    ///     .run(Operation::action("find_many").with_model("users"), |db| async move {
    ///         users::Entity::find().all(db.as_ref()).await
    ///     })
    ///     .await?;
    /// ```
    pub async fn run<T, F, Fut>(&self, op: Operation, f: F) -> Result<T, DbErr>
    where
        F: FnOnce(Arc<DatabaseConnection>) -> Fut,
        Fut: Future<Output = Result<T, DbErr>>,
        T: ResultShape,
    {
        self.interceptor.intercept(&op, f(self.conn.clone())).await
    }

    /// Backend of the wrapped connection; `None` once it was handed over disconnected.
    pub fn backend(&self) -> Option<DatabaseBackend> {
        self.backend
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Close the pool. Idempotent; close failures are logged, never returned.
    pub async fn disconnect(&self) {
        let performed = self
            .lifecycle
            .close_once(|| close_connection(&self.conn, self.options.error_format))
            .await;

        if !performed {
            debug!("db_client=disconnect skipped=already_disconnected");
        }
    }
}

async fn close_connection(conn: &DatabaseConnection, error_format: ErrorFormat) {
    match conn.close_by_ref().await {
        Ok(()) => info!("db_client=disconnected"),
        Err(e) => error!(
            "db_client=disconnect_failed error={}",
            error_format.render(&e)
        ),
    }
}

impl fmt::Debug for DbClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbClient")
            .field("env", &self.env)
            .field("lifecycle", &self.lifecycle())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ConnectionTrait for DbClient {
    fn get_database_backend(&self) -> DatabaseBackend {
        self.conn.get_database_backend()
    }

    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbErr> {
        self.interceptor
            .intercept(&Operation::action("execute"), self.conn.execute(stmt))
            .await
    }

    async fn execute_unprepared(&self, sql: &str) -> Result<ExecResult, DbErr> {
        self.interceptor
            .intercept(
                &Operation::action("execute_unprepared"),
                self.conn.execute_unprepared(sql),
            )
            .await
    }

    async fn query_one(&self, stmt: Statement) -> Result<Option<QueryResult>, DbErr> {
        self.interceptor
            .intercept(&Operation::action("query_one"), self.conn.query_one(stmt))
            .await
    }

    async fn query_all(&self, stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        self.interceptor
            .intercept(&Operation::action("query_all"), self.conn.query_all(stmt))
            .await
    }

    fn support_returning(&self) -> bool {
        self.conn.support_returning()
    }

    fn is_mock_connection(&self) -> bool {
        self.conn.is_mock_connection()
    }
}
