use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use tokio::sync::OnceCell;

/// Connection lifecycle of a client handle. `Disconnected` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    Active = 0,
    Disconnecting = 1,
    Disconnected = 2,
}

impl LifecycleState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => LifecycleState::Active,
            1 => LifecycleState::Disconnecting,
            _ => LifecycleState::Disconnected,
        }
    }
}

/// One-shot close guard.
///
/// The first caller runs the close routine; concurrent callers wait for it
/// to finish and later callers return immediately.
#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    state: AtomicU8,
    closed: OnceCell<()>,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Run `close` unless it already ran. Returns whether this call ran it.
    pub(crate) async fn close_once<F, Fut>(&self, close: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        if self.closed.initialized() {
            return false;
        }

        let performed = AtomicBool::new(false);
        let (performed_ref, state) = (&performed, &self.state);

        self.closed
            .get_or_init(move || async move {
                performed_ref.store(true, Ordering::Relaxed);
                state.store(LifecycleState::Disconnecting as u8, Ordering::Release);
                close().await;
                state.store(LifecycleState::Disconnected as u8, Ordering::Release);
            })
            .await;

        performed.into_inner()
    }
}
