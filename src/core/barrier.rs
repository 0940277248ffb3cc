//! # Counting barrier.
//!
//! An async wait-group: `add` and `done` move a counter, `wait` resolves once
//! the counter is back to zero. Built on a `tokio::sync::watch` channel so any
//! number of waiters observe the transition.

use tokio::sync::watch;

#[derive(Debug)]
pub(crate) struct Barrier {
    count: watch::Sender<usize>,
}

impl Barrier {
    pub(crate) fn new() -> Self {
        let (count, _rx) = watch::channel(0);
        Self { count }
    }

    pub(crate) fn add(&self) {
        self.count.send_modify(|n| *n += 1);
    }

    pub(crate) fn done(&self) {
        self.count.send_modify(|n| {
            debug_assert!(*n > 0, "barrier released more times than acquired");
            *n = n.saturating_sub(1);
        });
    }

    #[cfg(test)]
    pub(crate) fn count(&self) -> usize {
        *self.count.borrow()
    }

    /// Resolves when the counter reaches zero (immediately if it already is).
    pub(crate) async fn wait(&self) {
        let mut rx = self.count.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}
