//! Common utilities for integration tests

#![allow(dead_code)]

use debounce::Action;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Route `tracing` output (debug and above) through the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Records the instant of every fire
#[derive(Clone, Default)]
pub struct FireLog {
    fires: Arc<Mutex<Vec<Instant>>>,
}

impl FireLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Action appending to this log
    pub fn action(&self) -> Action {
        let fires = self.fires.clone();
        Action::from_fn(move || fires.lock().push(Instant::now()))
    }

    pub fn count(&self) -> usize {
        self.fires.lock().len()
    }

    pub fn fires(&self) -> Vec<Instant> {
        self.fires.lock().clone()
    }
}

/// Generous sleep for real-time tests
pub fn settle(delay: Duration) {
    std::thread::sleep(delay * 3);
}
