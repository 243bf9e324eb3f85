//! Per-key debouncing
//!
//! One independent `DebouncedTrigger` per key (a path, a record id, ...),
//! created on first request from an action factory. Keys do not interact:
//! there is no ordering or priority between them.

use crate::config::DebounceConfig;
use crate::scheduler::Scheduler;
use crate::trigger::DebouncedTrigger;
use action::Action;
use dashmap::DashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

type ActionFactory<K> = Box<dyn Fn(&K) -> Action + Send + Sync>;

/// Lazily created triggers, one per key
pub struct KeyedDebouncer<K>
where
    K: Eq + Hash,
{
    triggers: DashMap<K, DebouncedTrigger>,
    factory: ActionFactory<K>,
    delay: Duration,
    label: String,
    scheduler: Arc<dyn Scheduler>,
}

impl<K> KeyedDebouncer<K>
where
    K: Eq + Hash + Clone + Debug,
{
    /// Create a debouncer; `factory` builds the action for a new key
    pub fn new<F>(delay: Duration, scheduler: Arc<dyn Scheduler>, factory: F) -> Self
    where
        F: Fn(&K) -> Action + Send + Sync + 'static,
    {
        Self::build(delay, DebounceConfig::default().label, scheduler, factory)
    }

    /// Create a debouncer from configuration
    ///
    /// Each key's trigger is labelled `<label>[<key>]`.
    pub fn from_config<F>(config: &DebounceConfig, scheduler: Arc<dyn Scheduler>, factory: F) -> Self
    where
        F: Fn(&K) -> Action + Send + Sync + 'static,
    {
        Self::build(config.delay(), config.label.clone(), scheduler, factory)
    }

    fn build<F>(delay: Duration, label: String, scheduler: Arc<dyn Scheduler>, factory: F) -> Self
    where
        F: Fn(&K) -> Action + Send + Sync + 'static,
    {
        Self {
            triggers: DashMap::new(),
            factory: Box::new(factory),
            delay,
            label,
            scheduler,
        }
    }

    /// Request a fire for `key`, creating its trigger if needed
    ///
    /// The factory runs without any map lock held, so it may call back into
    /// this debouncer.
    pub fn request(&self, key: &K, reschedule: bool) {
        if let Some(trigger) = self.triggers.get(key) {
            trigger.request(reschedule);
            return;
        }

        // Built up front; discarded if another thread inserts the key first
        let action = (self.factory)(key);

        let trigger = self.triggers.entry(key.clone()).or_insert_with(|| {
            debug!(label = %self.label, ?key, "Creating trigger for key");
            DebouncedTrigger::with_label(
                format!("{}[{:?}]", self.label, key),
                action,
                self.delay,
                self.scheduler.clone(),
            )
        });
        trigger.request(reschedule);
    }

    /// Delay window of every key
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel a pending fire for `key`
    ///
    /// Returns false if the key has never been requested (or was removed).
    pub fn cancel(&self, key: &K) -> bool {
        match self.triggers.get(key) {
            Some(trigger) => {
                trigger.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every pending fire
    pub fn cancel_all(&self) {
        for trigger in self.triggers.iter() {
            trigger.cancel();
        }
    }

    /// Forget `key`, cancelling its pending fire
    pub fn remove(&self, key: &K) -> bool {
        self.triggers.remove(key).is_some()
    }

    /// Whether `key` has a fire pending
    pub fn is_pending(&self, key: &K) -> bool {
        self.triggers
            .get(key)
            .map(|trigger| trigger.is_pending())
            .unwrap_or(false)
    }

    /// Keys with a fire pending
    pub fn pending_keys(&self) -> Vec<K> {
        self.triggers
            .iter()
            .filter(|entry| entry.value().is_pending())
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Number of known keys
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}
