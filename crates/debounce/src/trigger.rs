//! Coalescing delay trigger
//!
//! Collapses bursts of `request` calls into a single deferred `Action` fire.
//! State is two-valued:
//! - Idle: nothing pending, no scheduled callback
//! - Pending: exactly one live scheduled callback, which fires the action
//!
//! Scheduler cancellation is only advisory. Whether a callback may fire is
//! decided under the trigger's lock by checking `pending` and the callback's
//! generation, so cancelled or superseded callbacks stay inert even when the
//! scheduler runs them anyway.

use crate::config::DebounceConfig;
use crate::scheduler::{ScheduledWork, Scheduler};
use action::Action;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, trace};

/// Mutable trigger state, always read and written as one unit
#[derive(Default)]
struct TriggerState {
    /// A fire is due
    pending: bool,
    /// Handle of the most recently scheduled callback
    scheduled: Option<ScheduledWork>,
    /// Identifies the most recently scheduled callback
    generation: u64,
}

struct Shared {
    label: String,
    action: Action,
    delay: Duration,
    scheduler: Arc<dyn Scheduler>,
    state: Mutex<TriggerState>,
}

impl Shared {
    /// Timer callback body
    fn fire(weak: &Weak<Shared>, generation: u64) {
        let Some(shared) = weak.upgrade() else {
            trace!("Trigger dropped before its callback ran");
            return;
        };

        {
            let mut state = shared.state.lock();
            if !state.pending || state.generation != generation {
                trace!(trigger = %shared.label, generation, "Stale callback skipped");
                return;
            }
            state.pending = false;
            state.scheduled = None;
        }

        // Outside the lock: the action may call back into request/cancel
        debug!(trigger = %shared.label, "Firing action");
        shared.action.perform(None);
    }
}

/// Debounced, coalescing trigger around one `Action`
///
/// `request` marks a fire as due and schedules it `delay` later; further
/// requests while pending are absorbed. `cancel` drops a pending fire.
/// All methods take `&self` and may be called from any thread.
pub struct DebouncedTrigger {
    shared: Arc<Shared>,
}

impl DebouncedTrigger {
    /// Create a trigger firing `action` `delay` after the first request
    pub fn new(action: Action, delay: Duration, scheduler: Arc<dyn Scheduler>) -> Self {
        Self::build("trigger".to_string(), action, delay, scheduler)
    }

    /// Create a trigger from configuration (delay and log label)
    pub fn from_config(
        action: Action,
        config: &DebounceConfig,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self::build(config.label.clone(), action, config.delay(), scheduler)
    }

    /// Create a trigger with an explicit log label
    pub fn with_label(
        label: impl Into<String>,
        action: Action,
        delay: Duration,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self::build(label.into(), action, delay, scheduler)
    }

    fn build(label: String, action: Action, delay: Duration, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            shared: Arc::new(Shared {
                label,
                action,
                delay,
                scheduler,
                state: Mutex::new(TriggerState::default()),
            }),
        }
    }

    /// Ask for the action to fire after the delay
    ///
    /// While a fire is already pending this is a no-op unless `reschedule`
    /// is set, in which case the delay window restarts from now.
    pub fn request(&self, reschedule: bool) {
        let shared = &self.shared;
        let mut state = shared.state.lock();

        if state.pending && !reschedule {
            trace!(trigger = %shared.label, "Request coalesced");
            return;
        }

        // Schedule before touching state, so a failing scheduler leaves it intact
        let generation = state.generation.wrapping_add(1);
        let weak = Arc::downgrade(shared);
        let work = shared.scheduler.schedule_after(
            shared.delay,
            Box::new(move || Shared::fire(&weak, generation)),
        );

        let rescheduling = state.pending;
        state.pending = true;
        state.generation = generation;
        if let Some(previous) = state.scheduled.replace(work) {
            previous.cancel();
        }

        if rescheduling {
            debug!(trigger = %shared.label, delay = ?shared.delay, "Rescheduled fire");
        } else {
            debug!(trigger = %shared.label, delay = ?shared.delay, "Scheduled fire");
        }
    }

    /// Drop any pending fire
    ///
    /// Idempotent. Once this returns, an earlier request will not fire, even
    /// if the scheduler still runs its callback.
    pub fn cancel(&self) {
        let mut state = self.shared.state.lock();
        let was_pending = state.pending;

        state.pending = false;
        if let Some(work) = state.scheduled.take() {
            work.cancel();
        }

        if was_pending {
            debug!(trigger = %self.shared.label, "Cancelled pending fire");
        }
    }

    /// Whether a fire is currently due
    pub fn is_pending(&self) -> bool {
        self.shared.state.lock().pending
    }

    /// Delay window
    pub fn delay(&self) -> Duration {
        self.shared.delay
    }

    /// Log label
    pub fn label(&self) -> &str {
        &self.shared.label
    }

    /// Wrapped action
    pub fn action(&self) -> &Action {
        &self.shared.action
    }
}

impl Drop for DebouncedTrigger {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock();
        state.pending = false;
        if let Some(work) = state.scheduled.take() {
            work.cancel();
        }
    }
}

impl fmt::Debug for DebouncedTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebouncedTrigger")
            .field("label", &self.shared.label)
            .field("delay", &self.shared.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}
