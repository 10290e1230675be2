//! Current snapshot plus the history that produced it.

use crate::types::Reducer;
use std::sync::Arc;

/// Fold `reducer` over `actions`, starting from `initial`.
///
/// An empty history yields the seed itself, without a copy.
pub fn replay<S, A, R>(reducer: &R, initial: &Arc<S>, actions: &[A]) -> Arc<S>
where
    R: Reducer<S, A> + ?Sized,
{
    let Some((first, rest)) = actions.split_first() else {
        return Arc::clone(initial);
    };

    let mut state = reducer.reduce(initial, first);
    for action in rest {
        state = reducer.reduce(&state, action);
    }
    Arc::new(state)
}

/// State held by a store: seed, current snapshot and action history.
pub struct Timeline<S, A> {
    /// Seed for replay, fixed at construction.
    initial: Arc<S>,
    /// Latest snapshot, equal to `replay(initial, history)`.
    current: Arc<S>,
    history: Vec<A>,
}

impl<S, A> Timeline<S, A> {
    pub fn new(initial: S) -> Self {
        let initial = Arc::new(initial);
        Self {
            current: Arc::clone(&initial),
            initial,
            history: Vec::new(),
        }
    }

    pub fn initial(&self) -> &Arc<S> {
        &self.initial
    }

    pub fn current(&self) -> &Arc<S> {
        &self.current
    }

    pub fn history(&self) -> &[A] {
        &self.history
    }

    /// History without its last entry, i.e. what undo will replay.
    pub fn history_before_last(&self) -> &[A] {
        match self.history.len() {
            0 => &[],
            n => &self.history[..n - 1],
        }
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Record a dispatched action together with the state it produced.
    pub fn commit(&mut self, action: A, next: Arc<S>) {
        self.history.push(action);
        self.current = next;
    }

    /// Drop the last action and install the replayed state for the rest.
    pub fn rewind(&mut self, replayed: Arc<S>) -> Option<A> {
        let undone = self.history.pop()?;
        self.current = replayed;
        Some(undone)
    }
}
