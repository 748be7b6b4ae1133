//! Atomic `f32` storage
//!
//! Stores the IEEE-754 bit pattern in an `AtomicU32`. Loads and stores are
//! single atomic operations, so a reader on the animation timeline never
//! blocks on a writer.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// An `f32` that can be shared between threads without a lock
pub struct AtomicF32 {
    bits: AtomicU32,
}

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self {
            bits: AtomicU32::new(value.to_bits()),
        }
    }

    pub fn load(&self, order: Ordering) -> f32 {
        f32::from_bits(self.bits.load(order))
    }

    pub fn store(&self, value: f32, order: Ordering) {
        self.bits.store(value.to_bits(), order);
    }

    /// Store `value` and return the previous value
    pub fn swap(&self, value: f32, order: Ordering) -> f32 {
        f32::from_bits(self.bits.swap(value.to_bits(), order))
    }
}

impl Default for AtomicF32 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl fmt::Debug for AtomicF32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicF32")
            .field(&self.load(Ordering::Relaxed))
            .finish()
    }
}
