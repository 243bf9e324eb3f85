//! The `Action` unit: receiver/message and/or closure, liveness gated

use crate::dispatch::{DirectDispatch, Dispatch, Message, Receiver};
use crate::liveness::Liveness;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::trace;

/// Argument passed along with a delivered message
pub type Argument = dyn Any + Send + Sync;

type Closure = Box<dyn Fn() + Send + Sync>;

/// Invocable unit
///
/// An action can carry a message for a receiver, a closure, or both. Calling
/// `perform` delivers the message (if any) and then runs the closure (if any).
/// Missing pieces are skipped silently.
///
/// The receiver is held weakly. An optional liveness observation ties the
/// whole action to a third object: once that object is gone the action is
/// invalid and `perform` does nothing.
pub struct Action {
    /// Message target (non-owning)
    receiver: Option<Weak<dyn Receiver>>,
    /// Message to deliver
    message: Option<Message>,
    /// Closure to run
    closure: Option<Closure>,
    /// Lifetime constraint, fixed at construction
    liveness: Option<Liveness>,
    /// How `message` reaches `receiver`
    dispatch: Arc<dyn Dispatch>,
}

impl Action {
    /// Action that sends `message` to `receiver`
    pub fn send<R>(receiver: &Arc<R>, message: impl Into<Message>) -> Self
    where
        R: Receiver + 'static,
    {
        let receiver: Weak<dyn Receiver> = Arc::<R>::downgrade(receiver);
        Self {
            receiver: Some(receiver),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Action that sends `message` to an already-weak receiver
    pub fn send_weak(receiver: Weak<dyn Receiver>, message: impl Into<Message>) -> Self {
        Self {
            receiver: Some(receiver),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Action that runs a closure
    pub fn from_fn<F>(closure: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            closure: Some(Box::new(closure)),
            ..Self::default()
        }
    }

    /// Only valid while `target` is alive
    pub fn observing<T>(self, target: &Arc<T>) -> Self
    where
        T: Any + Send + Sync,
    {
        self.with_liveness(Liveness::observe(target))
    }

    /// Only valid while `liveness` reports alive
    ///
    /// A liveness that is already dead makes the action invalid from the start.
    pub fn with_liveness(mut self, liveness: Liveness) -> Self {
        self.liveness = Some(liveness);
        self
    }

    /// Use a different delivery strategy (default: `DirectDispatch`)
    pub fn with_dispatch<D>(mut self, dispatch: D) -> Self
    where
        D: Dispatch + 'static,
    {
        self.dispatch = Arc::new(dispatch);
        self
    }

    /// Whether the action may still fire
    ///
    /// False once a configured liveness observation has died. Actions built
    /// without one are always valid.
    pub fn is_valid(&self) -> bool {
        match &self.liveness {
            Some(liveness) => liveness.is_alive(),
            None => true,
        }
    }

    /// Fire the action
    ///
    /// Delivers the message to the receiver with `argument`, then runs the
    /// closure. Both happen when both are configured. Does nothing when the
    /// action is invalid.
    pub fn perform(&self, argument: Option<&Argument>) {
        if !self.is_valid() {
            trace!("Action no longer valid, skipping perform");
            return;
        }

        if let Some(message) = &self.message {
            let receiver = self.receiver.as_ref().and_then(Weak::upgrade);
            // Delivery result is informational only
            let _ = self.dispatch.deliver(message, receiver.as_deref(), argument);
        }

        if let Some(closure) = &self.closure {
            closure();
        }
    }

    /// Current receiver, if set and still alive
    pub fn receiver(&self) -> Option<Arc<dyn Receiver>> {
        self.receiver.as_ref().and_then(Weak::upgrade)
    }

    /// Replace the receiver
    pub fn set_receiver<R>(&mut self, receiver: &Arc<R>)
    where
        R: Receiver + 'static,
    {
        let receiver: Weak<dyn Receiver> = Arc::<R>::downgrade(receiver);
        self.receiver = Some(receiver);
    }

    /// Remove the receiver
    pub fn clear_receiver(&mut self) {
        self.receiver = None;
    }

    /// Current message
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    /// Replace (or remove, with `None`) the message
    pub fn set_message(&mut self, message: Option<Message>) {
        self.message = message;
    }

    /// Whether a closure is configured
    pub fn has_closure(&self) -> bool {
        self.closure.is_some()
    }

    /// Replace the closure
    pub fn set_closure<F>(&mut self, closure: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.closure = Some(Box::new(closure));
    }

    /// Remove the closure
    pub fn clear_closure(&mut self) {
        self.closure = None;
    }

    /// Whether a liveness constraint was configured
    pub fn has_liveness(&self) -> bool {
        self.liveness.is_some()
    }
}

impl Default for Action {
    /// Action with nothing configured; `perform` is a no-op
    fn default() -> Self {
        Self {
            receiver: None,
            message: None,
            closure: None,
            liveness: None,
            dispatch: Arc::new(DirectDispatch),
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("message", &self.message)
            .field("has_receiver", &self.receiver().is_some())
            .field("has_closure", &self.closure.is_some())
            .field("liveness", &self.liveness)
            .finish()
    }
}
