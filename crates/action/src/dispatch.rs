//! Message delivery to receivers
//!
//! `Action` does not know how a message reaches its receiver. It hands the
//! message to a `Dispatch` implementation chosen at construction:
//! - `DirectDispatch`: call the receiver, nothing else
//! - `ResponderChain`: walk `next_responder` links until someone handles it

use crate::action::Argument;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};

/// Opaque message identifier (a selector, command name, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Message(Cow<'static, str>);

impl Message {
    /// Create a message from a static or owned name
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Message name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Message {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Message {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Object that can be sent a message
pub trait Receiver: Send + Sync {
    /// Handle a delivered message
    fn receive(&self, message: &Message, argument: Option<&Argument>);

    /// Whether this receiver handles `message`
    ///
    /// Only consulted by `ResponderChain`; direct dispatch always delivers.
    fn handles(&self, _message: &Message) -> bool {
        true
    }

    /// Next receiver to try when this one does not handle a message
    fn next_responder(&self) -> Option<Arc<dyn Receiver>> {
        None
    }
}

/// Deliver-to-receiver strategy
pub trait Dispatch: Send + Sync {
    /// Deliver `message` with `argument`
    ///
    /// Returns whether some receiver took the message. An absent receiver is
    /// a no-op that returns false.
    fn deliver(
        &self,
        message: &Message,
        receiver: Option<&dyn Receiver>,
        argument: Option<&Argument>,
    ) -> bool;
}

/// Plain method-call dispatch
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectDispatch;

impl Dispatch for DirectDispatch {
    fn deliver(
        &self,
        message: &Message,
        receiver: Option<&dyn Receiver>,
        argument: Option<&Argument>,
    ) -> bool {
        match receiver {
            Some(receiver) => {
                receiver.receive(message, argument);
                true
            }
            None => {
                trace!(%message, "No receiver, message dropped");
                false
            }
        }
    }
}

/// Responder-chain dispatch
///
/// Starts at the given receiver and follows `next_responder` until a
/// receiver reports that it `handles` the message.
#[derive(Debug, Clone, Copy)]
pub struct ResponderChain {
    /// Maximum number of `next_responder` hops (guards against cycles)
    max_depth: usize,
}

impl ResponderChain {
    /// Default hop limit
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    /// Create a chain walker with a custom hop limit
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Hop limit
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for ResponderChain {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

impl Dispatch for ResponderChain {
    fn deliver(
        &self,
        message: &Message,
        receiver: Option<&dyn Receiver>,
        argument: Option<&Argument>,
    ) -> bool {
        let Some(first) = receiver else {
            trace!(%message, "No receiver, message dropped");
            return false;
        };

        if first.handles(message) {
            first.receive(message, argument);
            return true;
        }

        let mut next = first.next_responder();
        let mut hops = 0;

        while let Some(current) = next {
            hops += 1;
            if hops > self.max_depth {
                warn!(%message, max_depth = self.max_depth, "Responder chain too deep, giving up");
                return false;
            }

            if current.handles(message) {
                current.receive(message, argument);
                return true;
            }

            next = current.next_responder();
        }

        trace!(%message, hops, "No responder handled message");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Receiver that records messages and optionally forwards to a parent
    struct Node {
        name: &'static str,
        accepts: Option<&'static str>,
        parent: Option<Arc<dyn Receiver>>,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Receiver for Node {
        fn receive(&self, message: &Message, _argument: Option<&Argument>) {
            self.log.lock().push(format!("{}:{}", self.name, message));
        }

        fn handles(&self, message: &Message) -> bool {
            self.accepts == Some(message.as_str())
        }

        fn next_responder(&self) -> Option<Arc<dyn Receiver>> {
            self.parent.clone()
        }
    }

    /// Receiver whose next responder is itself
    struct Loop {
        me: Mutex<Option<Arc<dyn Receiver>>>,
    }

    impl Receiver for Loop {
        fn receive(&self, _message: &Message, _argument: Option<&Argument>) {}

        fn handles(&self, _message: &Message) -> bool {
            false
        }

        fn next_responder(&self) -> Option<Arc<dyn Receiver>> {
            self.me.lock().clone()
        }
    }

    fn chain(log: &Arc<Mutex<Vec<String>>>) -> Node {
        let window: Arc<dyn Receiver> = Arc::new(Node {
            name: "window",
            accepts: Some("save"),
            parent: None,
            log: log.clone(),
        });
        let view: Arc<dyn Receiver> = Arc::new(Node {
            name: "view",
            accepts: Some("copy"),
            parent: Some(window),
            log: log.clone(),
        });
        Node {
            name: "button",
            accepts: None,
            parent: Some(view),
            log: log.clone(),
        }
    }

    #[test]
    fn test_direct_dispatch_ignores_handles() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let button = chain(&log);

        let delivered = DirectDispatch.deliver(&Message::from("paste"), Some(&button), None);

        assert!(delivered);
        assert_eq!(*log.lock(), vec!["button:paste".to_string()]);
    }

    #[test]
    fn test_absent_receiver_is_noop() {
        assert!(!DirectDispatch.deliver(&Message::from("save"), None, None));
        assert!(!ResponderChain::default().deliver(&Message::from("save"), None, None));
    }

    #[test]
    fn test_responder_chain_finds_handler() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let button = chain(&log);
        let dispatch = ResponderChain::default();

        assert!(dispatch.deliver(&Message::from("copy"), Some(&button), None));
        assert!(dispatch.deliver(&Message::from("save"), Some(&button), None));

        assert_eq!(
            *log.lock(),
            vec!["view:copy".to_string(), "window:save".to_string()]
        );
    }

    #[test]
    fn test_responder_chain_unhandled() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let button = chain(&log);

        let delivered =
            ResponderChain::default().deliver(&Message::from("print"), Some(&button), None);

        assert!(!delivered);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_responder_chain_cycle_is_bounded() {
        let node = Arc::new(Loop { me: Mutex::new(None) });
        let as_receiver: Arc<dyn Receiver> = node.clone();
        *node.me.lock() = Some(as_receiver);

        let dispatch = ResponderChain::with_max_depth(8);
        assert!(!dispatch.deliver(&Message::from("spin"), Some(&*node), None));

        // Break the cycle so the test doesn't leak
        node.me.lock().take();
    }

    #[test]
    fn test_message_display() {
        let message = Message::new(String::from("reloadData"));
        assert_eq!(message.to_string(), "reloadData");
        assert_eq!(message, Message::from("reloadData"));
    }
}
