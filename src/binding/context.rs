//! Store provider for consumer code.

use super::redo::RedoStack;
use super::selection::Selection;
use super::subscription::{DispatchListener, Subscription};
use crate::error::{Result, StoreError};
use crate::queue::Scheduler;
use crate::store::Store;
use std::sync::Arc;

/// Hands a store, and the scheduler for deferred notifications, to the code
/// that consumes it.
///
/// A context built with [`StoreContext::empty`] has no store; every accessor
/// then fails with [`StoreError::MissingProvider`].
pub struct StoreContext<S, A> {
    store: Option<Arc<Store<S, A>>>,
    scheduler: Arc<dyn Scheduler>,
}

impl<S, A> Clone for StoreContext<S, A> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            scheduler: Arc::clone(&self.scheduler),
        }
    }
}

impl<S, A> StoreContext<S, A>
where
    S: Send + Sync + 'static,
    A: Clone + Send + 'static,
{
    /// Context providing `store`.
    pub fn new(store: Arc<Store<S, A>>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            store: Some(store),
            scheduler,
        }
    }

    /// Context without a store.
    pub fn empty(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            store: None,
            scheduler,
        }
    }

    /// The provided store.
    pub fn store(&self) -> Result<&Arc<Store<S, A>>> {
        self.store.as_ref().ok_or(StoreError::MissingProvider)
    }

    pub fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.scheduler
    }

    pub fn get_state(&self) -> Result<Arc<S>> {
        Ok(self.store()?.get_state())
    }

    pub fn dispatch(&self, action: A) -> Result<()> {
        self.store()?.dispatch(action);
        Ok(())
    }

    pub fn undo(&self) -> Result<Option<A>> {
        Ok(self.store()?.undo())
    }

    pub fn can_undo(&self) -> Result<bool> {
        Ok(self.store()?.can_undo())
    }

    /// Run `callback` on the turn after any burst of store changes.
    pub fn subscription<F>(&self, callback: F) -> Result<Subscription>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let store = self.store()?;
        Ok(Subscription::new(
            &**store,
            Arc::clone(&self.scheduler),
            callback,
        ))
    }

    /// Receive every dispatched action on a later turn.
    pub fn dispatch_listener<F>(&self, listener: F) -> Result<DispatchListener>
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        let store = self.store()?;
        Ok(DispatchListener::new(
            &**store,
            Arc::clone(&self.scheduler),
            listener,
        ))
    }

    /// Keep `selector(state)` current, recomputed after store changes.
    pub fn select<T, F>(&self, selector: F) -> Result<Selection<T>>
    where
        T: PartialEq + Clone + Send + 'static,
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        let store = self.store()?;
        Ok(Selection::watch(
            store,
            Arc::clone(&self.scheduler),
            move |store: &Store<S, A>| selector(&store.get_state()),
        ))
    }

    /// Track whether the store has anything to undo.
    pub fn watch_can_undo(&self) -> Result<Selection<bool>> {
        let store = self.store()?;
        Ok(Selection::watch(
            store,
            Arc::clone(&self.scheduler),
            |store: &Store<S, A>| store.can_undo(),
        ))
    }

    /// Undo/redo pair over the provided store.
    pub fn redo_stack(&self) -> Result<RedoStack<S, A>> {
        Ok(RedoStack::new(Arc::clone(self.store()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::TurnScheduler;

    fn add(state: &i64, action: &i64) -> i64 {
        state + action
    }

    #[test]
    fn test_empty_context_is_missing_provider() {
        let context: StoreContext<i64, i64> = StoreContext::empty(Arc::new(TurnScheduler::new()));

        assert!(matches!(context.store(), Err(StoreError::MissingProvider)));
        assert!(matches!(context.dispatch(1), Err(StoreError::MissingProvider)));
        assert!(matches!(context.undo(), Err(StoreError::MissingProvider)));
        assert!(matches!(context.subscription(|| {}), Err(StoreError::MissingProvider)));
        assert!(matches!(context.watch_can_undo(), Err(StoreError::MissingProvider)));
    }

    #[test]
    fn test_forwards_to_store() {
        let store = Arc::new(Store::<i64, i64>::new(add, 10));
        let context = StoreContext::new(Arc::clone(&store), Arc::new(TurnScheduler::new()));

        context.dispatch(5).unwrap();
        assert_eq!(*context.get_state().unwrap(), 15);
        assert!(context.can_undo().unwrap());
        assert_eq!(context.undo().unwrap(), Some(5));
        assert_eq!(*store.get_state(), 10);
    }

    #[test]
    fn test_watch_can_undo() {
        let scheduler = Arc::new(TurnScheduler::new());
        let context = StoreContext::new(Arc::new(Store::<i64, i64>::new(add, 0)), scheduler.clone());
        let can_undo = context.watch_can_undo().unwrap();
        assert!(!can_undo.get());

        context.dispatch(1).unwrap();
        context.dispatch(1).unwrap();
        scheduler.run_turn();
        assert!(can_undo.get());
        assert_eq!(can_undo.changes(), 1);

        context.undo().unwrap();
        scheduler.run_turn();
        // Still one action left
        assert!(can_undo.get());

        context.undo().unwrap();
        scheduler.run_turn();
        assert!(!can_undo.get());
        assert_eq!(can_undo.changes(), 2);
    }

    #[test]
    fn test_select_state() {
        let scheduler = Arc::new(TurnScheduler::new());
        let context = StoreContext::new(Arc::new(Store::<i64, i64>::new(add, 0)), scheduler.clone());
        let parity = context.select(|state: &i64| state % 2 == 0).unwrap();

        context.dispatch(2).unwrap();
        scheduler.run_turn();
        assert!(parity.get());
        assert_eq!(parity.changes(), 0);

        context.dispatch(1).unwrap();
        scheduler.run_turn();
        assert!(!parity.get());
        assert_eq!(parity.changes(), 1);
    }
}
