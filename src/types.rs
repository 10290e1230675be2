//! Core types shared by the store, the registries and the deferred queue.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier handed out by a [`Registry`](crate::subscriptions::Registry)
/// for a subscriber or middleware.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegistrationId(pub u64);

impl fmt::Debug for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegistrationId({})", self.0)
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a task pending in a deferred execution queue.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl fmt::Debug for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskId({})", self.0)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a job scheduled on a [`Scheduler`](crate::queue::Scheduler).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

impl fmt::Debug for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimerId({})", self.0)
    }
}

/// Pure function mapping the current state and an action to the next state.
///
/// Undo replays the history through the reducer, so implementations must be
/// deterministic: the same `(state, action)` pair always yields the same
/// result.
pub trait Reducer<S, A>: Send + Sync {
    fn reduce(&self, state: &S, action: &A) -> S;
}

impl<S, A, F> Reducer<S, A> for F
where
    F: Fn(&S, &A) -> S + Send + Sync,
{
    fn reduce(&self, state: &S, action: &A) -> S {
        self(state, action)
    }
}

/// Transforms an action before it reaches the reducer.
///
/// Middlewares are chained in registration order, each one receiving the
/// output of the previous.
pub trait Middleware<A>: Send + Sync {
    fn process(&self, action: A) -> A;
}

impl<A, F> Middleware<A> for F
where
    F: Fn(A) -> A + Send + Sync,
{
    fn process(&self, action: A) -> A {
        self(action)
    }
}

/// Counters describing a store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Actions that went through the reducer via `dispatch`.
    pub dispatched: u64,
    /// Actions removed by `undo`.
    pub undone: u64,
    pub history_len: usize,
    pub subscribers: usize,
    pub middlewares: usize,
}
