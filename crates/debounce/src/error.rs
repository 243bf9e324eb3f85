//! Error types

use thiserror::Error;

/// Invalid or unparseable trigger configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("delay_ms {value} out of range (valid: 0-{max})")]
    DelayOutOfRange { value: u64, max: u64 },

    #[error("label must not be empty")]
    EmptyLabel,
}

/// Scheduler could not be created
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("No tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    #[error("Failed to spawn timer thread: {0}")]
    Spawn(#[from] std::io::Error),
}
