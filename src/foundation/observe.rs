//! Invalidation fan-out between frame providers and the views derived from them.
//!
//! Subscribers are stored as weak references: the hub never keeps a listener alive, and
//! listeners that have been dropped are pruned on the next notification.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, Weak,
    atomic::{AtomicU64, Ordering},
};

/// Receives "your derived state is stale" notifications.
pub trait InvalidationListener: Send + Sync {
    fn invalidated(&self);
}

/// Handle returned by [`Listeners::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Entry = (SubscriptionId, Weak<dyn InvalidationListener>);

/// Publish/subscribe hub for invalidation notifications.
#[derive(Default)]
pub struct Listeners {
    next_id: AtomicU64,
    entries: Mutex<Vec<Entry>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Weak<dyn InvalidationListener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, listener));
        id
    }

    /// Returns `false` if `id` was not (or no longer) subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|(eid, _)| *eid != id);
        entries.len() != before
    }

    pub fn notify_invalidated(&self) {
        // Listeners run outside the lock so they may subscribe or notify themselves.
        let live: Vec<Arc<dyn InvalidationListener>> = {
            let mut entries = self.lock();
            entries.retain(|(_, weak)| weak.strong_count() > 0);
            entries.iter().filter_map(|(_, weak)| weak.upgrade()).collect()
        };
        for listener in live {
            listener.invalidated();
        }
    }

    /// Number of subscriptions whose listener is still alive.
    pub fn len(&self) -> usize {
        self.lock()
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("live", &self.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/observe.rs"]
mod tests;
