//! Cooperative cancellation shared between the façade and the worker.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// Cancellation flag with an interruptible sleep.
///
/// The worker checks the flag between operations and sleeps through
/// [`CancelToken::sleep`] during backoff, so a forced shutdown interrupts a
/// pending retry delay immediately instead of waiting it out.
#[derive(Clone)]
pub(crate) struct CancelToken {
    inner: Arc<Inner>,
}

struct Inner {
    cancelled: Mutex<bool>,
    cond: Condvar,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: Mutex::new(false),
                cond: Condvar::new(),
            }),
        }
    }

    pub fn cancel(&self) {
        let mut cancelled = self.inner.cancelled.lock();
        *cancelled = true;
        self.inner.cond.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.lock()
    }

    /// Sleep for `duration`, waking early on cancellation.
    ///
    /// Returns `true` when the token was cancelled (before or during the
    /// sleep). A zero duration means "retry immediately" and only checks the
    /// flag.
    pub fn sleep(&self, duration: Duration) -> bool {
        let mut cancelled = self.inner.cancelled.lock();
        if *cancelled || duration.is_zero() {
            return *cancelled;
        }
        let _ = self.inner.cond.wait_for(&mut cancelled, duration);
        *cancelled
    }
}
