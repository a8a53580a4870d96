use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::runtime_env::RuntimeEnv;
use crate::error::AppError;

const SUPPORTED_SCHEMES: [&str; 3] = ["postgres://", "postgresql://", "sqlite:"];

/// Connection pool settings for the shared database client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_ms: u64,
    pub idle_timeout_ms: u64,
}

impl DbSettings {
    /// Settings for `url` with the defaults for `env`.
    pub fn new(url: impl Into<String>, env: RuntimeEnv) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(env),
            min_connections: 0,
            connect_timeout_ms: 5_000,
            idle_timeout_ms: 600_000,
        }
    }

    /// Build settings from environment variables; `DATABASE_URL` is required.
    pub fn from_env(env: RuntimeEnv) -> Result<Self, AppError> {
        let defaults = Self::new(must_var("DATABASE_URL")?, env);
        let settings = Self {
            max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: parse_var("DB_MIN_CONNECTIONS", defaults.min_connections)?,
            connect_timeout_ms: parse_var("DB_CONNECT_TIMEOUT_MS", defaults.connect_timeout_ms)?,
            idle_timeout_ms: parse_var("DB_IDLE_TIMEOUT_MS", defaults.idle_timeout_ms)?,
            url: defaults.url,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !SUPPORTED_SCHEMES.iter().any(|s| self.url.starts_with(s)) {
            return Err(AppError::config(format!(
                "DATABASE_URL must start with one of {SUPPORTED_SCHEMES:?}"
            )));
        }
        if self.max_connections == 0 {
            return Err(AppError::config("DB_MAX_CONNECTIONS must be at least 1"));
        }
        if self.min_connections > self.max_connections {
            return Err(AppError::config(format!(
                "DB_MIN_CONNECTIONS ({}) exceeds DB_MAX_CONNECTIONS ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

fn default_max_connections(env: RuntimeEnv) -> u32 {
    match env {
        RuntimeEnv::Prod => 10,
        RuntimeEnv::Dev => 5,
    }
}

/// Get required environment variable or return error
fn must_var(name: &str) -> Result<String, AppError> {
    env::var(name)
        .map_err(|_| AppError::config(format!("Required environment variable '{name}' is not set")))
}

/// Parse an optional environment variable, falling back to `default` when unset
fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            AppError::config(format!(
                "Environment variable '{name}' has an invalid value: '{raw}'"
            ))
        }),
        Err(_) => Ok(default),
    }
}
