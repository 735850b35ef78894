//! Shared, lock-guarded access to the record cache.

use std::sync::{Arc, Mutex};

use crate::record_list::RecordList;

/// A [`RecordList`] behind a mutex, shared between the coordinator, its
/// producers, and the renderer.
///
/// All access goes through [`with_lock`](Self::with_lock): the closure
/// receives `&mut RecordList` as proof that the lock is held, so composite
/// operations (insert + scroll, prune sweeps) are atomic to every other
/// reader without re-entrant locking.
#[derive(Clone, Default)]
pub struct SharedRecordList {
    inner: Arc<Mutex<RecordList>>,
}

impl SharedRecordList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access to the list.
    pub fn with_lock<T>(&self, f: impl FnOnce(&mut RecordList) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }
}
