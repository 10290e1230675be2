//! Redo built from `undo` and `dispatch`.

use crate::store::Store;
use crate::subscriptions::Unsubscribe;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct RedoState<A> {
    /// Undone actions, most recent last.
    undone: Mutex<Vec<A>>,
    /// Set while `redo` dispatches, consumed by the first middleware call.
    redoing: AtomicBool,
}

/// Clears `redoing` once the redone dispatch ends. If it unwinds before
/// committing, the action goes back on the stack.
struct RedoGuard<'a, S, A>
where
    S: 'static,
    A: Clone + 'static,
{
    store: &'a Store<S, A>,
    state: &'a RedoState<A>,
    /// Action and history length to restore on unwind.
    restore: Option<(A, usize)>,
}

impl<S, A> Drop for RedoGuard<'_, S, A>
where
    S: 'static,
    A: Clone + 'static,
{
    fn drop(&mut self) {
        self.state.redoing.store(false, Ordering::SeqCst);
        if let Some((action, history_len)) = self.restore.take() {
            // A subscriber panic unwinds after the commit; keep the redo then.
            if self.store.history_len() == history_len {
                self.state.undone.lock().push(action);
            }
        }
    }
}

/// Undo/redo pair on top of a store.
///
/// Actions undone through this stack can be redone, most recent first. Any
/// other dispatch to the store discards them, since the redo path no longer
/// continues from the current state.
///
/// A redone action goes through the middleware chain again.
pub struct RedoStack<S, A> {
    store: Arc<Store<S, A>>,
    state: Arc<RedoState<A>>,
    listener: Unsubscribe,
}

impl<S, A> RedoStack<S, A>
where
    S: Send + Sync + 'static,
    A: Clone + Send + 'static,
{
    pub fn new(store: Arc<Store<S, A>>) -> Self {
        let state = Arc::new(RedoState {
            undone: Mutex::new(Vec::new()),
            redoing: AtomicBool::new(false),
        });

        let listener = {
            let state = Arc::clone(&state);
            store.add_middleware(move |action: A| {
                if !state.redoing.swap(false, Ordering::SeqCst) {
                    let mut undone = state.undone.lock();
                    if !undone.is_empty() {
                        tracing::trace!(discarded = undone.len(), "redo stack invalidated");
                        undone.clear();
                    }
                }
                action
            })
        };

        Self {
            store,
            state,
            listener,
        }
    }

    /// Undo on the store and remember the action for redo.
    pub fn undo(&self) -> Option<A> {
        let action = self.store.undo()?;
        self.state.undone.lock().push(action.clone());
        Some(action)
    }

    /// Dispatch the most recently undone action again.
    pub fn redo(&self) -> Option<A> {
        let action = self.state.undone.lock().pop()?;

        let mut guard = RedoGuard {
            store: &self.store,
            state: &self.state,
            restore: Some((action.clone(), self.store.history_len())),
        };
        self.state.redoing.store(true, Ordering::SeqCst);
        self.store.dispatch(action.clone());
        guard.restore = None;

        Some(action)
    }

    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.state.undone.lock().is_empty()
    }

    /// Number of actions available for redo.
    pub fn redo_len(&self) -> usize {
        self.state.undone.lock().len()
    }

    pub fn store(&self) -> &Arc<Store<S, A>> {
        &self.store
    }
}

impl<S, A> Drop for RedoStack<S, A> {
    fn drop(&mut self) {
        self.listener.unsubscribe();
    }
}
