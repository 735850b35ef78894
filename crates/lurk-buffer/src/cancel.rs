//! Cooperative cancellation for the producer pair.
//!
//! [`CancelToken`] is a thread-safe, cloneable signal that producer tasks
//! poll between reads to detect cancellation. [`CancelToken::wait_timeout`]
//! doubles as an interruptible sleep, so the follow-mode EOF backoff wakes
//! immediately when the pair is cancelled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

struct Inner {
    cancelled: AtomicBool,
    lock: Mutex<()>,
    cond: Condvar,
}

/// The control handle that triggers cancellation.
///
/// Dropping the source does not cancel outstanding tokens; call
/// [`cancel`](Self::cancel) explicitly.
pub struct CancelSource {
    inner: Arc<Inner>,
}

/// A cloneable token observing a [`CancelSource`].
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelSource {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                lock: Mutex::new(()),
                cond: Condvar::new(),
            }),
        }
    }

    /// Obtain a token that observes this source.
    #[must_use]
    pub fn token(&self) -> CancelToken {
        CancelToken {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Signal cancellation. All tokens observe it and pending
    /// `wait_timeout` calls wake.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        let _guard = self.inner.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.inner.cond.notify_all();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Sleep for up to `duration`, waking early on cancellation.
    ///
    /// Returns `true` if cancelled.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        let guard = self.inner.lock.lock().unwrap_or_else(|e| e.into_inner());
        let (_guard, _timeout) = self
            .inner
            .cond
            .wait_timeout(guard, duration)
            .unwrap_or_else(|e| e.into_inner());
        self.is_cancelled()
    }
}
