//! Backend test support utilities
//!
//! Unified logging initialization, in-memory log capture for asserting on
//! emitted lines, and sea-orm mock connection builders.

pub mod log_capture;
pub mod logging;
pub mod mock_db;
