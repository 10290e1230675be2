//! Consumer-side helpers built on the store's public contract.
//!
//! A [`StoreContext`] provides a store to the code that needs it, together
//! with the scheduler used for deferred notifications. Everything created
//! from a context wraps its callback in a private
//! [`DeferredExecutionQueue`](crate::queue::DeferredExecutionQueue), so a
//! burst of store changes turns into one notification per listener on the
//! next turn.
//!
//! All guards release their registration when dropped.

mod context;
mod redo;
mod selection;
mod subscription;

pub use context::StoreContext;
pub use redo::RedoStack;
pub use selection::Selection;
pub use subscription::{DispatchListener, Subscription};
