//! # fabux
//!
//! A reducer-based state store with undo history, a middleware pipeline and
//! subscriber notifications, plus a deferred execution queue that coalesces
//! bursts of notifications into one flush.
//!
//! ## Core Concepts
//!
//! - **Store**: holds the state, reduces dispatched actions and keeps the
//!   history they came from
//! - **Undo**: pops the history and replays the rest from the initial state
//! - **Middleware**: transforms actions before the reducer, in registration order
//! - **Deferred queue**: runs queued tasks together on the next scheduler turn
//! - **Bindings**: subscriptions, selections and redo for consumer code
//!
//! ## Example
//!
//! ```
//! use fabux::{create_store, Store};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum Action {
//!     Add(i64),
//! }
//!
//! let store: Store<i64, Action> = create_store(
//!     |state: &i64, action: &Action| match action {
//!         Action::Add(n) => state + n,
//!     },
//!     0,
//! );
//!
//! let _unsubscribe = store.subscribe(|| println!("state changed"));
//!
//! store.dispatch(Action::Add(2));
//! store.dispatch(Action::Add(3));
//! assert_eq!(*store.get_state(), 5);
//!
//! assert_eq!(store.undo(), Some(Action::Add(3)));
//! assert_eq!(*store.get_state(), 2);
//! ```

pub mod binding;
pub mod error;
pub mod queue;
pub mod state;
pub mod store;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use binding::{DispatchListener, RedoStack, Selection, StoreContext, Subscription};
pub use error::{Result, StoreError};
pub use queue::{DeferredExecutionQueue, FlushReport, Scheduler, TaskHandle, TurnScheduler};
pub use store::{create_store, Store, StoreConfig};
pub use subscriptions::Unsubscribe;
pub use types::*;
