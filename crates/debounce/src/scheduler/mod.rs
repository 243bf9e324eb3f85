//! Delayed callback scheduling
//!
//! A `Scheduler` runs a callback once after a delay and hands back a
//! `ScheduledWork` handle. Cancelling the handle is best effort: a callback
//! that is already running, or a scheduler that ignores cancellation, may
//! still invoke it. Triggers never rely on cancellation for correctness.

pub mod manual;
pub mod thread;
pub mod tokio_impl;

pub use manual::ManualScheduler;
pub use thread::ThreadScheduler;
pub use tokio_impl::TokioScheduler;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One-shot callback run by a scheduler
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Longest delay a scheduler honours; longer delays are clamped to it
///
/// About thirty years, far enough out to never come due while still
/// representable as an `Instant` deadline on every platform.
pub const MAX_DELAY: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Delay clamped to `MAX_DELAY`
pub fn clamp_delay(delay: Duration) -> Duration {
    delay.min(MAX_DELAY)
}

/// Timer backend
///
/// Implementations must not invoke `callback` before `schedule_after`
/// returns; callers may hold locks across the call.
pub trait Scheduler: Send + Sync {
    /// Run `callback` once, `delay` from now
    fn schedule_after(&self, delay: Duration, callback: Callback) -> ScheduledWork;
}

/// Something that can be asked to stop a scheduled callback
pub trait Cancel: Send + Sync {
    /// Best-effort cancellation
    fn cancel(&self);
}

impl Cancel for tokio::task::AbortHandle {
    fn cancel(&self) {
        self.abort();
    }
}

/// Shared cancellation flag checked by a scheduler before it runs a callback
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Cancel for CancelFlag {
    fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Handle to a scheduled callback
///
/// Dropping the handle does not cancel the callback.
pub struct ScheduledWork {
    handle: Box<dyn Cancel>,
}

impl ScheduledWork {
    pub fn new<C>(handle: C) -> Self
    where
        C: Cancel + 'static,
    {
        Self {
            handle: Box::new(handle),
        }
    }

    /// Ask the scheduler not to run the callback
    pub fn cancel(&self) {
        self.handle.cancel();
    }
}

impl fmt::Debug for ScheduledWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledWork").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_flag_through_handle() {
        let flag = CancelFlag::new();
        let work = ScheduledWork::new(flag.clone());

        assert!(!flag.is_cancelled());
        work.cancel();
        assert!(flag.is_cancelled());

        // Idempotent
        work.cancel();
        assert!(flag.is_cancelled());
    }

    #[test]
    fn test_clamp_delay() {
        assert_eq!(clamp_delay(Duration::from_millis(5)), Duration::from_millis(5));
        assert_eq!(clamp_delay(MAX_DELAY), MAX_DELAY);
        assert_eq!(clamp_delay(Duration::MAX), MAX_DELAY);
    }

    #[test]
    fn test_drop_does_not_cancel() {
        let flag = CancelFlag::new();
        drop(ScheduledWork::new(flag.clone()));
        assert!(!flag.is_cancelled());
    }
}
