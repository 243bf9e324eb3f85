//! Scheduler backed by a tokio runtime

use super::{clamp_delay, Callback, ScheduledWork, Scheduler};
use crate::error::SchedulerError;
use std::time::Duration;
use tokio::runtime::Handle;

/// Spawns one sleeping task per scheduled callback
///
/// Cancellation aborts the task. A task that has already woken up and is
/// running the callback is not interrupted.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Schedule onto the given runtime
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Schedule onto the runtime of the calling context
    pub fn current() -> Result<Self, SchedulerError> {
        Ok(Self::new(Handle::try_current()?))
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, callback: Callback) -> ScheduledWork {
        // Deadline is fixed now, not when the task first gets polled
        let deadline = tokio::time::Instant::now() + clamp_delay(delay);
        let task = self.handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            callback();
        });

        ScheduledWork::new(task.abort_handle())
    }
}
