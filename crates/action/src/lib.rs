//! Invocable actions for Coalesce
//!
//! This crate provides:
//! - `Action`: a receiver/message pair and/or a closure, fired with `perform`
//! - Liveness gating through non-owning `Weak` observations
//! - Pluggable message delivery (direct call or responder chain)

pub mod action;
pub mod dispatch;
pub mod liveness;

// Re-exports
pub use action::{Action, Argument};
pub use dispatch::{DirectDispatch, Dispatch, Message, Receiver, ResponderChain};
pub use liveness::Liveness;
