//! Infrastructure layer - client construction and state assembly.

pub mod db;
pub mod state;
