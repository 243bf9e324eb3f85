//! Scheduler with a dedicated timer thread
//!
//! For callers without an async runtime. Callbacks are queued to the timer
//! thread over a channel and run there, one at a time, in deadline order.

use super::{clamp_delay, Callback, CancelFlag, ScheduledWork, Scheduler};
use crate::error::SchedulerError;
use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

enum Command {
    Schedule {
        deadline: Instant,
        callback: Callback,
        cancelled: CancelFlag,
    },
    Shutdown,
}

/// Timer-thread scheduler
///
/// Cancellation sets a flag the timer thread checks right before running a
/// callback. Dropping the scheduler stops the thread; callbacks that have not
/// run yet are discarded.
pub struct ThreadScheduler {
    tx: Sender<Command>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadScheduler {
    /// Start a timer thread with the default name
    pub fn new() -> Result<Self, SchedulerError> {
        Self::with_name("coalesce-timer")
    }

    /// Start a timer thread with the given name
    pub fn with_name(name: &str) -> Result<Self, SchedulerError> {
        let (tx, rx) = unbounded();

        let worker = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run_timer_loop(rx))?;

        debug!(thread = name, "Started timer thread");

        Ok(Self {
            tx,
            worker: Mutex::new(Some(worker)),
        })
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule_after(&self, delay: Duration, callback: Callback) -> ScheduledWork {
        let cancelled = CancelFlag::new();
        let command = Command::Schedule {
            deadline: Instant::now() + clamp_delay(delay),
            callback,
            cancelled: cancelled.clone(),
        };

        if self.tx.send(command).is_err() {
            warn!("Timer thread gone, callback dropped");
        }

        ScheduledWork::new(cancelled)
    }
}

impl Drop for ThreadScheduler {
    fn drop(&mut self) {
        let _ = self.tx.send(Command::Shutdown);

        if let Some(worker) = self.worker.lock().take() {
            // The last owner may be a callback running on the timer thread itself
            if worker.thread().id() == thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                warn!("Timer thread panicked");
            }
        }
    }
}

fn run_timer_loop(rx: crossbeam_channel::Receiver<Command>) {
    // Keyed by (deadline, sequence) so equal deadlines keep submission order
    let mut queue: BTreeMap<(Instant, u64), (Callback, CancelFlag)> = BTreeMap::new();
    let mut seq = 0u64;

    loop {
        let next_deadline = queue.keys().next().map(|&(deadline, _)| deadline);
        let received = match next_deadline {
            Some(deadline) => {
                let now = Instant::now();
                if deadline <= now {
                    if let Some((_, (callback, cancelled))) = queue.pop_first() {
                        run_callback(callback, &cancelled);
                    }
                    continue;
                }
                rx.recv_timeout(deadline - now)
            }
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(Command::Schedule {
                deadline,
                callback,
                cancelled,
            }) => {
                // Drop cancelled work early so rescheduling with long delays
                // cannot grow the queue past the live callbacks
                queue.retain(|_, (_, cancelled)| !cancelled.is_cancelled());
                queue.insert((deadline, seq), (callback, cancelled));
                seq += 1;
            }
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                debug!(discarded = queue.len(), "Timer thread shutting down");
                break;
            }
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
}

fn run_callback(callback: Callback, cancelled: &CancelFlag) {
    if cancelled.is_cancelled() {
        return;
    }

    // A panicking callback must not take the timer thread down with it
    if catch_unwind(AssertUnwindSafe(callback)).is_err() {
        warn!("Scheduled callback panicked");
    }
}
