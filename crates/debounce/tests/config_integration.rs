//! Loading trigger configuration from disk

mod common;

use anyhow::Result;
use common::{settle, FireLog};
use debounce::config::load;
use debounce::{ConfigError, DebouncedTrigger, ManualScheduler, ThreadScheduler};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_load_config_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("debounce.toml");
    fs::write(&path, "delay_ms = 40\nlabel = \"rebuild\"\n")?;

    let config = load(&path)?;
    assert_eq!(config.delay(), Duration::from_millis(40));
    assert_eq!(config.label, "rebuild");

    let log = FireLog::new();
    let trigger =
        DebouncedTrigger::from_config(log.action(), &config, Arc::new(ThreadScheduler::new()?));
    assert_eq!(trigger.label(), "rebuild");

    trigger.request(false);
    trigger.request(false);
    settle(config.delay());
    assert_eq!(log.count(), 1);

    Ok(())
}

#[test]
fn test_partial_config_uses_defaults() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("debounce.toml");
    fs::write(&path, "label = \"only-label\"\n")?;

    let config = load(&path)?;
    assert_eq!(config.delay_ms, 250);
    assert_eq!(config.label, "only-label");

    let scheduler = Arc::new(ManualScheduler::new());
    let log = FireLog::new();
    let trigger = DebouncedTrigger::from_config(log.action(), &config, scheduler.clone());
    trigger.request(false);

    scheduler.advance(Duration::from_millis(249));
    assert_eq!(log.count(), 0);
    scheduler.advance(Duration::from_millis(1));
    assert_eq!(log.count(), 1);

    Ok(())
}

#[test]
fn test_missing_file_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.toml");

    let err = load(&path).unwrap_err();
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn test_out_of_range_delay_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("debounce.toml");
    fs::write(&path, "delay_ms = 99999999\n").unwrap();

    let err = load(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::DelayOutOfRange { .. })
    ));
}

#[test]
fn test_malformed_toml_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("debounce.toml");
    fs::write(&path, "delay_ms = = 3\n").unwrap();

    let err = load(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::Parse(_))
    ));
}
