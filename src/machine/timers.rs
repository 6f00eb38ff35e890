//! Per-event cancellable delay slots backing debounce.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

struct PendingTimer {
    id: u64,
    handle: JoinHandle<()>,
}

/// At most one pending timer task per event name.
///
/// A timer task must [`claim`](Self::claim) its slot before doing any work;
/// once claimed it can no longer be cancelled, so a fired timer always runs
/// its dispatch to completion.
pub(crate) struct TimerRegistry {
    next_id: AtomicU64,
    pending: Mutex<HashMap<String, PendingTimer>>,
}

impl TimerRegistry {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Spawn the task built by `make` into `event`'s slot, cancelling any
    /// timer already there. Returns whether a pending timer was superseded.
    ///
    /// The task receives its slot id for use with `claim`.
    pub(crate) fn replace<F, Fut>(&self, event: &str, runtime: &Handle, make: F) -> bool
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        // Spawn under the lock so the task cannot claim before it is registered.
        let mut pending = self.pending.lock();
        let superseded = pending.remove(event).map(|timer| timer.handle.abort()).is_some();
        let handle = runtime.spawn(make(id));
        pending.insert(event.to_string(), PendingTimer { id, handle });
        superseded
    }

    /// Cancel `event`'s pending timer. Returns whether one was pending.
    pub(crate) fn cancel(&self, event: &str) -> bool {
        match self.pending.lock().remove(event) {
            Some(timer) => {
                timer.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Remove the slot if it still belongs to timer `id`.
    pub(crate) fn claim(&self, event: &str, id: u64) -> bool {
        let mut pending = self.pending.lock();
        match pending.get(event) {
            Some(timer) if timer.id == id => {
                pending.remove(event);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn is_pending(&self, event: &str) -> bool {
        self.pending.lock().contains_key(event)
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.lock().len()
    }
}
