//! Timing and logging around every database operation.
//!
//! The interceptor never changes an operation's outcome: successes are
//! logged (development only) with the elapsed time and a size annotation,
//! failures are logged in every mode and handed back to the caller as-is.

use std::fmt;
use std::future::Future;
use std::time::Instant;

use sea_orm::{ExecResult, QueryResult};
use serde_json::Value;
use tracing::{error, info};

use crate::config::client::ErrorFormat;
use crate::config::runtime_env::RuntimeEnv;

/// Logged in place of a missing model name.
pub const MODEL_PLACEHOLDER: &str = "raw";
/// Logged in place of a missing action name.
pub const ACTION_PLACEHOLDER: &str = "unknown";

/// Describes one database call for logging purposes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    model: Option<String>,
    action: Option<String>,
    params: Value,
}

impl Operation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operation named after what it does, e.g. `find_many`.
    pub fn action(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or(MODEL_PLACEHOLDER)
    }

    pub fn action_name(&self) -> &str {
        self.action.as_deref().unwrap_or(ACTION_PLACEHOLDER)
    }

    pub fn params(&self) -> &Value {
        &self.params
    }
}

/// How many records an operation produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSize {
    /// A sequence of this many elements
    Items(usize),
    /// Any single non-empty value
    Item,
    /// No value at all
    Absent,
}

/// Classifies an operation result for the size annotation.
///
/// Any present, non-sequence value counts as one item, including counts
/// and flags. Entity models opt in with an empty impl.
pub trait ResultShape {
    fn result_size(&self) -> ResultSize {
        ResultSize::Item
    }
}

impl<T> ResultShape for Vec<T> {
    fn result_size(&self) -> ResultSize {
        ResultSize::Items(self.len())
    }
}

impl<T: ResultShape> ResultShape for Option<T> {
    fn result_size(&self) -> ResultSize {
        self.as_ref()
            .map_or(ResultSize::Absent, ResultShape::result_size)
    }
}

impl ResultShape for () {
    fn result_size(&self) -> ResultSize {
        ResultSize::Absent
    }
}

impl ResultShape for Value {
    fn result_size(&self) -> ResultSize {
        match self {
            Value::Null => ResultSize::Absent,
            Value::Array(items) => ResultSize::Items(items.len()),
            _ => ResultSize::Item,
        }
    }
}

impl ResultShape for ExecResult {}
impl ResultShape for QueryResult {}
impl ResultShape for u64 {}
impl ResultShape for i64 {}
impl ResultShape for bool {}
impl ResultShape for String {}

/// Wraps operations with timing and outcome logging.
#[derive(Debug, Clone, Copy)]
pub struct OpInterceptor {
    env: RuntimeEnv,
    error_format: ErrorFormat,
}

impl OpInterceptor {
    pub fn new(env: RuntimeEnv, error_format: ErrorFormat) -> Self {
        Self { env, error_format }
    }

    /// Await `operation`, log its outcome, and return it unchanged.
    pub async fn intercept<T, E, Fut>(&self, op: &Operation, operation: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        T: ResultShape,
        E: fmt::Display + fmt::Debug,
    {
        let start = Instant::now();
        let outcome = operation.await;
        let duration_ms = start.elapsed().as_millis();

        let model = op.model_name();
        let action = op.action_name();

        match &outcome {
            Ok(value) if self.env.is_dev() => match value.result_size() {
                ResultSize::Items(count) => info!(
                    "db_op model={model} action={action} duration_ms={duration_ms} items={count}"
                ),
                ResultSize::Item => {
                    info!("db_op model={model} action={action} duration_ms={duration_ms} item=1")
                }
                ResultSize::Absent => {
                    info!("db_op model={model} action={action} duration_ms={duration_ms}")
                }
            },
            Ok(_) => {}
            Err(err) => error!(
                "db_op=failed model={model} action={action} duration_ms={duration_ms} error={}",
                self.error_format.render(err)
            ),
        }

        outcome
    }
}
