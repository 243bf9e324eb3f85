//! Coalescing delay triggers for Coalesce
//!
//! This crate provides:
//! - `DebouncedTrigger`: at most one deferred `Action` fire per delay window
//! - Pluggable schedulers (tokio, dedicated timer thread, manual clock)
//! - Per-key debouncing (`KeyedDebouncer`)
//! - TOML configuration

pub mod config;
pub mod error;
pub mod keyed;
pub mod scheduler;
pub mod trigger;

// Re-exports
pub use action::{Action, Liveness, Message, Receiver};
pub use config::DebounceConfig;
pub use error::{ConfigError, SchedulerError};
pub use keyed::KeyedDebouncer;
pub use scheduler::{
    Callback, Cancel, ManualScheduler, ScheduledWork, Scheduler, ThreadScheduler, TokioScheduler,
};
pub use trigger::DebouncedTrigger;
