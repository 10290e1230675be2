//! Deferred execution queue.

use super::scheduler::Scheduler;
use crate::types::{TaskId, TimerId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Unit of work handed to [`DeferredExecutionQueue::execute`].
pub type Task = Box<dyn FnOnce() + Send>;

/// Outcome of a flush.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushReport {
    /// Tasks that ran to completion.
    pub ran: usize,
    /// Tasks that panicked. Their panic was logged and swallowed.
    pub panicked: usize,
}

impl FlushReport {
    /// Total tasks taken off the queue by this flush.
    pub fn total(&self) -> usize {
        self.ran + self.panicked
    }
}

struct QueueState {
    /// Tasks waiting for a flush. Ids only grow, so key order is
    /// registration order.
    pending: BTreeMap<TaskId, Task>,
    /// The one scheduled flush, if any.
    timer: Option<ScheduledFlush>,
    /// Sequence number of the last scheduled flush.
    flush_seq: u64,
}

/// A flush handed to the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ScheduledFlush {
    seq: u64,
    timer: TimerId,
}

struct QueueInner {
    state: Mutex<QueueState>,
    /// Counter for generating task ids.
    next_id: AtomicU64,
    scheduler: Arc<dyn Scheduler>,
}

impl QueueInner {
    /// Scheduled flush `seq` fired.
    fn on_timer(&self, seq: u64) {
        {
            let mut state = self.state.lock();
            // Cancelled by flush or clear in the meantime, possibly with a
            // newer flush scheduled since.
            if state.timer.map(|flush| flush.seq) != Some(seq) {
                tracing::trace!(seq, "stale flush ignored");
                return;
            }
            state.timer = None;
        }
        let report = self.run_pending();
        tracing::debug!(ran = report.ran, panicked = report.panicked, "deferred flush");
    }

    fn cancel_timer(&self) {
        let scheduled = self.state.lock().timer.take();
        if let Some(flush) = scheduled {
            self.scheduler.cancel(flush.timer);
        }
    }

    /// Run every task that was pending when this call started.
    ///
    /// Each task is removed before it runs. Tasks enqueued by a running task
    /// get ids past the boundary and wait for a later flush.
    fn run_pending(&self) -> FlushReport {
        let mut report = FlushReport::default();
        let boundary = self.state.lock().pending.keys().next_back().copied();
        let Some(last) = boundary else {
            return report;
        };

        loop {
            let next = {
                let mut state = self.state.lock();
                let head = state.pending.keys().next().copied();
                match head {
                    Some(id) if id <= last => state.pending.remove(&id).map(|task| (id, task)),
                    _ => None,
                }
            };
            let Some((id, task)) = next else {
                break;
            };

            match panic::catch_unwind(AssertUnwindSafe(task)) {
                Ok(()) => report.ran += 1,
                Err(payload) => {
                    report.panicked += 1;
                    tracing::error!(task = %id, reason = panic_message(&*payload), "deferred task panicked");
                }
            }
        }

        report
    }
}

impl Drop for QueueInner {
    fn drop(&mut self) {
        if let Some(flush) = self.state.get_mut().timer.take() {
            self.scheduler.cancel(flush.timer);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

/// Coalesces tasks into a single flush on the scheduler's next turn.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct DeferredExecutionQueue {
    inner: Arc<QueueInner>,
}

impl DeferredExecutionQueue {
    /// Create a queue that schedules its flushes on `scheduler`.
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState {
                    pending: BTreeMap::new(),
                    timer: None,
                    flush_seq: 0,
                }),
                next_id: AtomicU64::new(1),
                scheduler,
            }),
        }
    }

    /// Enqueue `task` for the next flush.
    ///
    /// Schedules a flush if none is pending. The returned handle cancels
    /// this task only.
    pub fn execute<F>(&self, task: F) -> TaskHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let id = TaskId(self.inner.next_id.fetch_add(1, Ordering::SeqCst));
        let mut state = self.inner.state.lock();
        state.pending.insert(id, Box::new(task));

        if state.timer.is_none() {
            state.flush_seq += 1;
            let seq = state.flush_seq;
            let queue = Arc::downgrade(&self.inner);
            let timer = self.inner.scheduler.schedule(Box::new(move || {
                if let Some(queue) = queue.upgrade() {
                    queue.on_timer(seq);
                }
            }));
            state.timer = Some(ScheduledFlush { seq, timer });
            tracing::trace!(task = %id, ?timer, seq, "flush scheduled");
        }

        TaskHandle {
            id,
            queue: Arc::downgrade(&self.inner),
        }
    }

    /// Cancel the scheduled flush and run the pending tasks now.
    pub fn flush(&self) -> FlushReport {
        self.inner.cancel_timer();
        let report = self.inner.run_pending();
        tracing::debug!(ran = report.ran, panicked = report.panicked, "explicit flush");
        report
    }

    /// Cancel the scheduled flush and discard pending tasks unrun.
    pub fn clear(&self) {
        self.inner.cancel_timer();
        let discarded = mem::take(&mut self.inner.state.lock().pending);
        if !discarded.is_empty() {
            tracing::trace!(discarded = discarded.len(), "queue cleared");
        }
        // Tasks drop here, outside the lock.
    }

    /// Tasks waiting for a flush.
    pub fn pending_len(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Whether a flush is scheduled.
    pub fn is_scheduled(&self) -> bool {
        self.inner.state.lock().timer.is_some()
    }
}

impl fmt::Debug for DeferredExecutionQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("DeferredExecutionQueue")
            .field("pending", &state.pending.len())
            .field("timer", &state.timer.map(|flush| flush.timer))
            .finish()
    }
}

/// Cancellation handle for one enqueued task.
pub struct TaskHandle {
    id: TaskId,
    queue: Weak<QueueInner>,
}

impl TaskHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Remove the task if it has not run yet.
    ///
    /// Returns false if it already ran, was cancelled or cleared.
    pub fn cancel(&self) -> bool {
        let Some(queue) = self.queue.upgrade() else {
            return false;
        };
        let task = queue.state.lock().pending.remove(&self.id);
        tracing::trace!(task = %self.id, removed = task.is_some(), "task cancel");
        task.is_some()
    }

    /// Whether the task is still waiting to run.
    pub fn is_pending(&self) -> bool {
        self.queue
            .upgrade()
            .map(|queue| queue.state.lock().pending.contains_key(&self.id))
            .unwrap_or(false)
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle").field("id", &self.id).finish()
    }
}
