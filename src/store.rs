//! The store: reducer, undo history, middleware chain and subscribers.

use crate::state::{replay, Timeline};
use crate::subscriptions::{Registry, Subscriber, Unsubscribe};
use crate::types::{Middleware, Reducer, StoreStats};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Store configuration.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Name attached to the store's log events.
    pub name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "store".to_string(),
        }
    }
}

/// Create a store from a reducer and the initial state.
pub fn create_store<S, A, R>(reducer: R, initial_state: S) -> Store<S, A>
where
    S: 'static,
    A: Clone + 'static,
    R: Reducer<S, A> + 'static,
{
    Store::new(reducer, initial_state)
}

/// Reducer-based state container with undo.
///
/// - `dispatch` runs an action through the middlewares, records it in the
///   history, reduces it and notifies subscribers.
/// - `undo` pops the last action and replays the remaining history from the
///   initial state.
///
/// There is no redo here. Keep the action returned by `undo` and dispatch it
/// again to redo it; [`RedoStack`](crate::binding::RedoStack) does exactly
/// that.
///
/// No internal lock is held while the reducer, a middleware or a subscriber
/// runs, so subscribers may read from or dispatch to the store.
pub struct Store<S, A> {
    config: StoreConfig,

    reducer: Box<dyn Reducer<S, A>>,

    /// Seed, current snapshot and history.
    timeline: Mutex<Timeline<S, A>>,

    subscribers: Arc<Registry<Subscriber>>,

    middlewares: Arc<Registry<Arc<dyn Middleware<A>>>>,

    /// Actions reduced by dispatch.
    dispatched: AtomicU64,

    /// Actions removed by undo.
    undone: AtomicU64,
}

impl<S, A> Store<S, A>
where
    S: 'static,
    A: Clone + 'static,
{
    pub fn new<R>(reducer: R, initial_state: S) -> Self
    where
        R: Reducer<S, A> + 'static,
    {
        Self::with_config(reducer, initial_state, StoreConfig::default())
    }

    pub fn with_config<R>(reducer: R, initial_state: S, config: StoreConfig) -> Self
    where
        R: Reducer<S, A> + 'static,
    {
        Self {
            config,
            reducer: Box::new(reducer),
            timeline: Mutex::new(Timeline::new(initial_state)),
            subscribers: Arc::new(Registry::new()),
            middlewares: Arc::new(Registry::new()),
            dispatched: AtomicU64::new(0),
            undone: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // --- State ---

    /// Current state snapshot.
    pub fn get_state(&self) -> Arc<S> {
        Arc::clone(self.timeline.lock().current())
    }

    /// Dispatch an action.
    ///
    /// The middleware chain is captured when the call starts: middlewares
    /// registered by a middleware do not see this action. The history is
    /// appended only once the reducer has returned, so a panicking reducer
    /// leaves both state and history untouched.
    ///
    /// The reducer runs with no lock held. If another thread commits first,
    /// the action is reduced again against the newer state, so the reducer
    /// may run more than once per dispatch.
    pub fn dispatch(&self, action: A) {
        let chain = self.middlewares.snapshot();
        let action = chain
            .iter()
            .fold(action, |action, middleware| middleware.process(action));

        let mut attempts = 0u32;
        let history_len = loop {
            attempts += 1;
            let current = self.get_state();
            let next = Arc::new(self.reducer.reduce(&current, &action));

            let mut timeline = self.timeline.lock();
            // Still the snapshot this action was reduced against.
            if Arc::ptr_eq(timeline.current(), &current) {
                timeline.commit(action, next);
                break timeline.len();
            }
        };
        self.dispatched.fetch_add(1, Ordering::SeqCst);

        tracing::debug!(
            store = %self.config.name,
            middlewares = chain.len(),
            history_len,
            attempts,
            "dispatch"
        );

        self.notify_all();
    }

    // --- History ---

    /// Undo the most recent action.
    ///
    /// Returns `None` and does nothing when the history is empty. Otherwise
    /// the state is rebuilt by replaying the remaining history from the
    /// initial state, subscribers are notified, and the undone action is
    /// returned so the caller can dispatch it again later.
    pub fn undo(&self) -> Option<A> {
        let (undone, history_len) = loop {
            let (initial, seen, remaining) = {
                let timeline = self.timeline.lock();
                if timeline.is_empty() {
                    tracing::trace!(store = %self.config.name, "nothing to undo");
                    return None;
                }
                (
                    Arc::clone(timeline.initial()),
                    Arc::clone(timeline.current()),
                    timeline.history_before_last().to_vec(),
                )
            };

            let replayed = replay(&*self.reducer, &initial, &remaining);

            let mut timeline = self.timeline.lock();
            // Replay again if another dispatch or undo committed meanwhile.
            if Arc::ptr_eq(timeline.current(), &seen) && timeline.len() == remaining.len() + 1 {
                let undone = timeline.rewind(replayed)?;
                break (undone, timeline.len());
            }
        };
        self.undone.fetch_add(1, Ordering::SeqCst);

        tracing::debug!(store = %self.config.name, history_len, "undo");

        self.notify_all();
        Some(undone)
    }

    /// Whether there is anything to undo.
    pub fn can_undo(&self) -> bool {
        !self.timeline.lock().is_empty()
    }

    /// Copy of the action history, oldest first.
    pub fn history(&self) -> Vec<A> {
        self.timeline.lock().history().to_vec()
    }

    pub fn history_len(&self) -> usize {
        self.timeline.lock().len()
    }

    // --- Registrations ---

    /// Register a callback run after every dispatch and undo.
    pub fn subscribe<F>(&self, subscriber: F) -> Unsubscribe
    where
        F: Fn() + Send + Sync + 'static,
    {
        let subscriber: Subscriber = Arc::new(subscriber);
        Registry::register(&self.subscribers, subscriber)
    }

    /// Register a middleware applied to every later dispatch.
    pub fn add_middleware<M>(&self, middleware: M) -> Unsubscribe
    where
        M: Middleware<A> + 'static,
    {
        let middleware: Arc<dyn Middleware<A>> = Arc::new(middleware);
        Registry::register(&self.middlewares, middleware)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn middleware_count(&self) -> usize {
        self.middlewares.len()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            dispatched: self.dispatched.load(Ordering::SeqCst),
            undone: self.undone.load(Ordering::SeqCst),
            history_len: self.history_len(),
            subscribers: self.subscriber_count(),
            middlewares: self.middleware_count(),
        }
    }

    /// Call every subscriber registered when this round starts.
    fn notify_all(&self) {
        for subscriber in self.subscribers.snapshot() {
            subscriber();
        }
    }
}

impl<S, A> fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.config.name)
            .field("history_len", &self.timeline.lock().len())
            .field("subscribers", &self.subscribers.len())
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}
