//! Memoized values derived from a store.

use super::subscription::Subscription;
use crate::queue::{FlushReport, Scheduler};
use crate::store::Store;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

struct Selected<T> {
    value: Mutex<T>,
    /// Times the value changed since the selection was created.
    changes: AtomicU64,
}

/// A value read from the store and kept current.
///
/// The value is recomputed after each (coalesced) store change and replaced
/// only when it differs from the previous one.
pub struct Selection<T> {
    selected: Arc<Selected<T>>,
    subscription: Subscription,
}

impl<T> Selection<T>
where
    T: PartialEq + Clone + Send + 'static,
{
    pub(crate) fn watch<S, A, F>(store: &Arc<Store<S, A>>, scheduler: Arc<dyn Scheduler>, read: F) -> Self
    where
        S: Send + Sync + 'static,
        A: Clone + Send + 'static,
        F: Fn(&Store<S, A>) -> T + Send + Sync + 'static,
    {
        let selected = Arc::new(Selected {
            value: Mutex::new(read(store)),
            changes: AtomicU64::new(0),
        });

        let subscription = {
            let selected = Arc::clone(&selected);
            let weak: Weak<Store<S, A>> = Arc::downgrade(store);
            Subscription::new(&**store, scheduler, move || {
                let Some(store) = weak.upgrade() else {
                    return;
                };
                let next = read(&store);
                let mut value = selected.value.lock();
                if *value != next {
                    *value = next;
                    selected.changes.fetch_add(1, Ordering::SeqCst);
                }
            })
        };

        Self {
            selected,
            subscription,
        }
    }

    /// Current selected value.
    pub fn get(&self) -> T {
        self.selected.value.lock().clone()
    }

    /// Number of times the selected value changed.
    pub fn changes(&self) -> u64 {
        self.selected.changes.load(Ordering::SeqCst)
    }

    /// Recompute now instead of on the next turn.
    pub fn flush(&self) -> FlushReport {
        self.subscription.flush()
    }
}

impl<T: fmt::Debug> fmt::Debug for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("value", &*self.selected.value.lock())
            .field("changes", &self.selected.changes.load(Ordering::SeqCst))
            .finish()
    }
}
