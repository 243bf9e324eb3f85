//! Non-owning lifetime observation
//!
//! A `Liveness` answers one question: is the observed object still alive?
//! It never keeps the object alive itself.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

/// Non-owning observation of another object's lifetime
///
/// Once the observed object is dropped, `is_alive` returns false forever.
#[derive(Clone)]
pub struct Liveness {
    handle: Weak<dyn Any + Send + Sync>,
}

impl Liveness {
    /// Observe a shared object without extending its lifetime
    pub fn observe<T>(target: &Arc<T>) -> Self
    where
        T: Any + Send + Sync,
    {
        let handle: Weak<dyn Any + Send + Sync> = Arc::<T>::downgrade(target);
        Self { handle }
    }

    /// Wrap an existing weak handle
    ///
    /// A handle that is already dangling (e.g. `Weak::new()`) is accepted and
    /// simply reports dead.
    pub fn from_weak<T>(handle: Weak<T>) -> Self
    where
        T: Any + Send + Sync,
    {
        let handle: Weak<dyn Any + Send + Sync> = handle;
        Self { handle }
    }

    /// Whether the observed object is still alive
    pub fn is_alive(&self) -> bool {
        self.handle.strong_count() > 0
    }
}

impl fmt::Debug for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Liveness")
            .field("alive", &self.is_alive())
            .finish()
    }
}
