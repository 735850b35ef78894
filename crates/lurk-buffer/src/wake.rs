//! Broadcast wake-up for the producer pair.
//!
//! The coordinator pokes producers whenever their read targets may have
//! changed (scroll, resize, eagerness, follow toggles). A generation counter
//! under a condvar makes the signal lossless: a producer that was busy when
//! the notification fired sees the bumped generation on its next wait and
//! returns immediately, so there is no missed-wakeup window.

use std::sync::{Condvar, Mutex};

/// A lossless broadcast signal.
pub struct Wake {
    generation: Mutex<u64>,
    cond: Condvar,
}

impl Wake {
    pub fn new() -> Self {
        Self {
            generation: Mutex::new(0),
            cond: Condvar::new(),
        }
    }

    /// The current generation, for seeding a waiter.
    #[must_use]
    pub fn subscribe(&self) -> u64 {
        *self.generation.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Wake all current and future waiters of the current generation.
    pub fn notify(&self) {
        let mut generation = self.generation.lock().unwrap_or_else(|e| e.into_inner());
        *generation += 1;
        self.cond.notify_all();
    }

    /// Block until the generation advances past `seen`, then update `seen`.
    ///
    /// Returns immediately if a notification already happened since `seen`
    /// was taken.
    pub fn wait(&self, seen: &mut u64) {
        let mut generation = self.generation.lock().unwrap_or_else(|e| e.into_inner());
        while *generation == *seen {
            generation = self
                .cond
                .wait(generation)
                .unwrap_or_else(|e| e.into_inner());
        }
        *seen = *generation;
    }
}

impl Default for Wake {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn notification_before_wait_is_not_lost() {
        let wake = Wake::new();
        let mut seen = wake.subscribe();
        wake.notify();
        // Returns immediately instead of blocking.
        wake.wait(&mut seen);
        assert_eq!(seen, 1);
    }

    #[test]
    fn notify_wakes_a_blocked_waiter() {
        let wake = Arc::new(Wake::new());
        let waiter = Arc::clone(&wake);
        let handle = std::thread::spawn(move || {
            let mut seen = waiter.subscribe();
            waiter.wait(&mut seen);
            seen
        });
        std::thread::sleep(Duration::from_millis(20));
        wake.notify();
        assert_eq!(handle.join().unwrap(), 1);
    }
}
