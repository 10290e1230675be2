//! The "next turn" primitive deferred flushes are scheduled on.

use crate::types::TimerId;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Work scheduled for a later turn.
pub type Job = Box<dyn FnOnce() + Send>;

/// Runs jobs after the current synchronous execution has completed.
///
/// `schedule` must never invoke the job before returning.
pub trait Scheduler: Send + Sync {
    /// Schedule `job` for a later turn.
    fn schedule(&self, job: Job) -> TimerId;

    /// Cancel a scheduled job. Returns false if it already ran or was
    /// cancelled.
    fn cancel(&self, id: TimerId) -> bool;
}

/// Host-driven event loop.
///
/// Each call to [`run_turn`](Self::run_turn) runs the jobs that were
/// scheduled before it started. Jobs scheduled while a turn is running wait
/// for the next one, the same way a zero-delay timer would.
pub struct TurnScheduler {
    /// Scheduled jobs by id, in scheduling order.
    jobs: Mutex<BTreeMap<TimerId, Job>>,
    /// Counter for generating timer ids.
    next_id: AtomicU64,
    /// Turns completed so far.
    turns: AtomicU64,
}

impl TurnScheduler {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            turns: AtomicU64::new(0),
        }
    }

    /// Jobs waiting for a turn.
    pub fn pending_jobs(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Number of completed turns.
    pub fn turns(&self) -> u64 {
        self.turns.load(Ordering::SeqCst)
    }

    /// Run one turn. Returns the number of jobs that ran.
    pub fn run_turn(&self) -> usize {
        let due: Vec<TimerId> = self.jobs.lock().keys().copied().collect();
        let mut ran = 0;

        for id in due {
            // A job earlier in this turn may have cancelled this one.
            let job = self.jobs.lock().remove(&id);
            if let Some(job) = job {
                job();
                ran += 1;
            }
        }

        let turn = self.turns.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!(turn, ran, "turn complete");
        ran
    }

    /// Run turns until nothing is scheduled or `max_turns` have run.
    ///
    /// Returns the number of turns that ran.
    pub fn run_until_idle(&self, max_turns: usize) -> usize {
        let mut turns = 0;
        while turns < max_turns && self.pending_jobs() > 0 {
            self.run_turn();
            turns += 1;
        }
        turns
    }
}

impl Scheduler for TurnScheduler {
    fn schedule(&self, job: Job) -> TimerId {
        let id = TimerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.jobs.lock().insert(id, job);
        id
    }

    fn cancel(&self, id: TimerId) -> bool {
        self.jobs.lock().remove(&id).is_some()
    }
}

impl Default for TurnScheduler {
    fn default() -> Self {
        Self::new()
    }
}
