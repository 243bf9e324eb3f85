//! Virtual-clock scheduler
//!
//! Nothing runs until `advance` is called. Useful for driving triggers
//! deterministically, including against a backend that ignores cancellation.

use super::{clamp_delay, Callback, CancelFlag, ScheduledWork, Scheduler};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Default)]
struct ManualState {
    /// Virtual time elapsed since creation
    now: Duration,
    /// Submission counter, breaks deadline ties
    seq: u64,
    queue: BTreeMap<(Duration, u64), (Callback, CancelFlag)>,
}

/// Scheduler driven by an explicit virtual clock
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
    /// Run cancelled callbacks anyway
    ignore_cancel: bool,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler that runs callbacks even after they were cancelled
    pub fn ignoring_cancel() -> Self {
        Self {
            ignore_cancel: true,
            ..Self::default()
        }
    }

    /// Virtual time elapsed since creation
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Number of queued callbacks that would still run
    pub fn pending(&self) -> usize {
        let state = self.state.lock();
        state
            .queue
            .values()
            .filter(|(_, cancelled)| self.ignore_cancel || !cancelled.is_cancelled())
            .count()
    }

    /// Move the clock forward by `by`, running every callback that comes due
    ///
    /// Callbacks run in deadline order, outside the scheduler's lock, with the
    /// clock set to their deadline. Callbacks scheduled while advancing run in
    /// the same call if they come due within the window. Returns how many
    /// callbacks ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now().saturating_add(by);
        let mut ran = 0;

        loop {
            let next = {
                let mut state = self.state.lock();
                let next_deadline = state.queue.keys().next().map(|&(deadline, _)| deadline);
                match next_deadline {
                    Some(deadline) if deadline <= target => {
                        state.now = deadline;
                        state.queue.pop_first()
                    }
                    _ => None,
                }
            };

            let Some((_, (callback, cancelled))) = next else {
                break;
            };

            if self.ignore_cancel || !cancelled.is_cancelled() {
                callback();
                ran += 1;
            }
        }

        self.state.lock().now = target;
        ran
    }

    /// Run callbacks already due at the current time
    pub fn run_due(&self) -> usize {
        self.advance(Duration::ZERO)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_after(&self, delay: Duration, callback: Callback) -> ScheduledWork {
        let cancelled = CancelFlag::new();

        let mut state = self.state.lock();
        let deadline = state.now.saturating_add(clamp_delay(delay));
        let seq = state.seq;
        state.seq += 1;
        state
            .queue
            .insert((deadline, seq), (callback, cancelled.clone()));

        ScheduledWork::new(cancelled)
    }
}
