//! Destruction probes for verifying ownership behaviour.
//!
//! A resource wrapped in a probe reports its destruction, so tests can check
//! that every resource is destroyed exactly once and in the expected order.

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Shared counter of destroyed [`Tracked`] values.
///
/// # Example
/// ```rust,ignore
/// use smartptr::testing::prelude::*;
/// use smartptr::ExclusiveOwner;
///
/// let drops = DropCounter::new();
/// drop(ExclusiveOwner::new(drops.track("tim")));
/// assert_eq!(drops.count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DropCounter(Arc<AtomicUsize>);

impl DropCounter {
    /// Create a counter with no recorded drops
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked values destroyed so far
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// Wrap `value` so its destruction increments this counter
    pub fn track<V>(&self, value: V) -> Tracked<V> {
        Tracked {
            value,
            counter: self.clone(),
        }
    }
}

/// A value whose destruction is counted by a [`DropCounter`].
pub struct Tracked<V> {
    value: V,
    counter: DropCounter,
}

impl<V> Deref for Tracked<V> {
    type Target = V;

    fn deref(&self) -> &V {
        &self.value
    }
}

impl<V: fmt::Debug> fmt::Debug for Tracked<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tracked").field(&self.value).finish()
    }
}

impl<V> Drop for Tracked<V> {
    fn drop(&mut self) {
        self.counter.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Ordered record of destroyed [`Named`] values.
#[derive(Debug, Clone, Default)]
pub struct DropLog(Arc<Mutex<Vec<String>>>);

impl DropLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a value that appends `name` to this log when destroyed
    pub fn named(&self, name: impl Into<String>) -> Named {
        Named {
            name: name.into(),
            log: self.clone(),
        }
    }

    /// Names destroyed so far, in destruction order
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Whether `name` has been destroyed
    pub fn contains(&self, name: &str) -> bool {
        self.0.lock().iter().any(|entry| entry == name)
    }

    /// How many times `name` has been destroyed
    pub fn times_destroyed(&self, name: &str) -> usize {
        self.0.lock().iter().filter(|entry| *entry == name).count()
    }
}

/// A named value that records its destruction in a [`DropLog`].
pub struct Named {
    name: String,
    log: DropLog,
}

impl Named {
    /// The name this value was created with
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Named {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Named").field(&self.name).finish()
    }
}

impl Drop for Named {
    fn drop(&mut self) {
        self.log.0.lock().push(self.name.clone());
    }
}
