//! Observer registry implementing the store contract.

use super::Fsm;
use crate::core::{EventArg, State};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

type Callback<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// Subscribers in insertion order, keyed by registration id so the same
/// closure can be registered more than once.
pub(crate) struct SubscriberRegistry<S> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Callback<S>)>>,
}

impl<S> SubscriberRegistry<S> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            entries: Mutex::new(Vec::new()),
        }
    }

    fn add(&self, callback: Callback<S>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries.lock().push((id, callback));
        id
    }

    fn remove(&self, id: u64) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    /// Invoke every current subscriber with `state`.
    ///
    /// Callbacks run outside the lock so they may subscribe or unsubscribe.
    pub(crate) fn notify(&self, state: &S) {
        let callbacks: Vec<Callback<S>> = self
            .entries
            .lock()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(state);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

/// Removes one subscription when [`unsubscribe`](Self::unsubscribe) is called.
///
/// Dropping the handle does not unsubscribe.
#[must_use = "dropping an Unsubscribe handle leaves the callback subscribed forever"]
pub struct Unsubscribe<S> {
    registry: Weak<SubscriberRegistry<S>>,
    id: u64,
}

impl<S> Unsubscribe<S> {
    /// Stop receiving notifications. Returns `false` if the subscription was
    /// already gone.
    pub fn unsubscribe(self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.remove(self.id))
    }
}

impl<S: State, A: EventArg> Fsm<S, A> {
    /// Subscribe to state changes.
    ///
    /// The callback is invoked with the current state before this returns,
    /// then once after every dispatch whose chain changed the net state.
    pub fn subscribe<F>(&self, callback: F) -> Unsubscribe<S>
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let callback: Callback<S> = Arc::new(callback);
        let (id, current) = {
            let state = self.inner.state.read();
            let id = self.inner.subscribers.add(Arc::clone(&callback));
            (id, state.clone())
        };
        callback(&current);

        Unsubscribe {
            registry: Arc::downgrade(&self.inner.subscribers),
            id,
        }
    }
}
