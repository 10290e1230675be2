//! Deferred execution: coalescing many `execute` calls into one flush.
//!
//! A [`DeferredExecutionQueue`] collects tasks and asks its [`Scheduler`]
//! for a single flush on the next turn. Every task enqueued before that
//! turn runs in the same flush, in the order it was enqueued.
//!
//! # Example
//!
//! ```
//! use fabux::queue::{DeferredExecutionQueue, TurnScheduler};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let scheduler = Arc::new(TurnScheduler::new());
//! let queue = DeferredExecutionQueue::new(scheduler.clone());
//! let runs = Arc::new(AtomicUsize::new(0));
//!
//! for _ in 0..3 {
//!     let runs = runs.clone();
//!     queue.execute(move || {
//!         runs.fetch_add(1, Ordering::SeqCst);
//!     });
//! }
//! assert_eq!(scheduler.pending_jobs(), 1);
//!
//! scheduler.run_turn();
//! assert_eq!(runs.load(Ordering::SeqCst), 3);
//! ```

mod deferred;
mod scheduler;

pub use deferred::{DeferredExecutionQueue, FlushReport, Task, TaskHandle};
pub use scheduler::{Job, Scheduler, TurnScheduler};
