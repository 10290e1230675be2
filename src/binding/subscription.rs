//! Deferred store subscriptions and dispatch listeners.

use crate::queue::{DeferredExecutionQueue, FlushReport, Scheduler, TaskHandle};
use crate::store::Store;
use crate::subscriptions::Unsubscribe;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Store subscription whose callback runs on the next scheduler turn.
///
/// Any number of store changes before that turn produce a single callback
/// invocation. Dropping the guard unsubscribes and discards a pending
/// notification.
pub struct Subscription {
    unsubscribe: Unsubscribe,
    queue: DeferredExecutionQueue,
}

impl Subscription {
    pub(crate) fn new<S, A, F>(store: &Store<S, A>, scheduler: Arc<dyn Scheduler>, callback: F) -> Self
    where
        S: Send + Sync + 'static,
        A: Clone + Send + 'static,
        F: Fn() + Send + Sync + 'static,
    {
        let queue = DeferredExecutionQueue::new(scheduler);
        let callback = Arc::new(callback);
        let pending: Mutex<Option<TaskHandle>> = Mutex::new(None);

        let unsubscribe = {
            let queue = queue.clone();
            store.subscribe(move || {
                let mut pending = pending.lock();
                if pending.as_ref().is_some_and(TaskHandle::is_pending) {
                    return;
                }
                let callback = Arc::clone(&callback);
                *pending = Some(queue.execute(move || callback()));
            })
        };

        Self { unsubscribe, queue }
    }

    /// Deliver a pending notification now instead of on the next turn.
    pub fn flush(&self) -> FlushReport {
        self.queue.flush()
    }

    /// Whether a notification is waiting for the next turn.
    pub fn is_pending(&self) -> bool {
        self.queue.pending_len() > 0
    }

    /// Unsubscribe and drop any pending notification.
    pub fn release(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe.unsubscribe();
        self.queue.clear();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.unsubscribe.id())
            .field("queue", &self.queue)
            .finish()
    }
}

/// Observes every dispatched action on the next scheduler turn.
///
/// Registered as a middleware that passes actions through unchanged, so it
/// sees the action as transformed by the middlewares registered before it.
/// Each action gets its own deferred call, in dispatch order.
pub struct DispatchListener {
    unsubscribe: Unsubscribe,
    queue: DeferredExecutionQueue,
}

impl DispatchListener {
    pub(crate) fn new<S, A, F>(store: &Store<S, A>, scheduler: Arc<dyn Scheduler>, listener: F) -> Self
    where
        S: Send + Sync + 'static,
        A: Clone + Send + 'static,
        F: Fn(A) + Send + Sync + 'static,
    {
        let queue = DeferredExecutionQueue::new(scheduler);
        let listener = Arc::new(listener);

        let unsubscribe = {
            let queue = queue.clone();
            store.add_middleware(move |action: A| {
                let listener = Arc::clone(&listener);
                let observed = action.clone();
                queue.execute(move || listener(observed));
                action
            })
        };

        Self { unsubscribe, queue }
    }

    /// Deliver pending actions now.
    pub fn flush(&self) -> FlushReport {
        self.queue.flush()
    }

    /// Actions waiting for delivery.
    pub fn pending_len(&self) -> usize {
        self.queue.pending_len()
    }

    /// Stop listening and drop undelivered actions.
    pub fn release(self) {}
}

impl Drop for DispatchListener {
    fn drop(&mut self) {
        self.unsubscribe.unsubscribe();
        self.queue.clear();
    }
}

impl fmt::Debug for DispatchListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchListener")
            .field("id", &self.unsubscribe.id())
            .field("queue", &self.queue)
            .finish()
    }
}
