//! Process shutdown wiring for the shared client.

pub mod shutdown;

pub use shutdown::{
    drain_or_abort, wait_for_signal, DrainOutcome, ShutdownController, ShutdownSignal,
};
