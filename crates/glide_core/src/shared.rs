//! Shared values read from the animation timeline
//!
//! Two flavours:
//!
//! - [`SharedScalar`]: a single `f32` with a monotonically increasing version.
//!   Readers poll the version instead of subscribing.
//! - [`SnapshotCell`]: an immutable `Arc<T>` swapped in whole. A reader either
//!   holds the previous snapshot or the new one, never a mix.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::atomic::AtomicF32;

// ============================================================================
// SharedScalar
// ============================================================================

/// A lock-free `f32` with change tracking
#[derive(Debug)]
pub struct SharedScalar {
    value: AtomicF32,
    version: AtomicU64,
}

impl SharedScalar {
    pub fn new(initial: f32) -> Self {
        Self {
            value: AtomicF32::new(initial),
            version: AtomicU64::new(0),
        }
    }

    pub fn get(&self) -> f32 {
        self.value.load(Ordering::Acquire)
    }

    /// Write a new value
    ///
    /// The version only advances when the bit pattern changes, so repeated
    /// writes of the same value are invisible to observers.
    pub fn set(&self, value: f32) -> bool {
        let previous = self.value.swap(value, Ordering::AcqRel);
        if previous.to_bits() == value.to_bits() {
            return false;
        }
        self.version.fetch_add(1, Ordering::AcqRel);
        true
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Whether a write happened after `seen` was observed
    pub fn changed_since(&self, seen: u64) -> bool {
        self.version() != seen
    }
}

impl Default for SharedScalar {
    fn default() -> Self {
        Self::new(0.0)
    }
}

// ============================================================================
// SnapshotCell
// ============================================================================

/// Atomically published immutable snapshot
///
/// Writers build a complete `T` off to the side and swap it in with
/// [`publish`](Self::publish). The write lock is held only for the pointer
/// swap.
#[derive(Debug)]
pub struct SnapshotCell<T> {
    current: RwLock<Arc<T>>,
    version: AtomicU64,
}

impl<T> SnapshotCell<T> {
    pub fn new(initial: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            version: AtomicU64::new(0),
        }
    }

    /// Get the current snapshot
    pub fn load(&self) -> Arc<T> {
        let guard = self.current.read().unwrap_or_else(crate::recover);
        Arc::clone(&guard)
    }

    /// Replace the snapshot and return the new version
    pub fn publish(&self, next: T) -> u64 {
        self.publish_arc(Arc::new(next))
    }

    pub fn publish_arc(&self, next: Arc<T>) -> u64 {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(crate::recover);
        *guard = next;
        // Bumped while the write lock is held so version and snapshot agree
        self.version.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}

impl<T: Default> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
