//! Process configuration read from the environment.

pub mod client;
pub mod db;
pub mod runtime_env;

pub use client::{ClientOptions, ErrorFormat, LogLevel};
pub use db::DbSettings;
pub use runtime_env::RuntimeEnv;
