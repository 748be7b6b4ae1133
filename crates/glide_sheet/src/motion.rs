//! Shared motion state
//!
//! The canonical values every other part of the sheet reads: position,
//! index, next-target index, and committed index. Each is an independent
//! [`SharedScalar`], so the animation timeline reads them without locking
//! and observers detect changes by comparing versions.
//!
//! Only the controller writes (through crate-private setters), and it
//! serializes its writers, so each value has exactly one writer per frame.

use std::sync::atomic::{AtomicBool, Ordering};

use glide_core::SharedScalar;

use crate::snap::CLOSED_INDEX;

/// Stored in the next-target slot while at rest
const UNSET: f32 = f32::NEG_INFINITY;

#[derive(Debug)]
pub struct MotionState {
    position: SharedScalar,
    index: SharedScalar,
    next_target_index: SharedScalar,
    current_index: SharedScalar,
    gesture_active: AtomicBool,
    disposed: AtomicBool,
}

/// Copy of the motion values taken at one instant
///
/// Dependent visuals are pure functions of a snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionSnapshot {
    pub position: f32,
    pub index: f32,
    pub next_target_index: Option<f32>,
    pub current_index: i32,
    pub gesture_active: bool,
}

impl MotionSnapshot {
    /// A sheet resting at `index` / `position`
    pub fn at_rest(index: i32, position: f32) -> Self {
        Self {
            position,
            index: index as f32,
            next_target_index: None,
            current_index: index,
            gesture_active: false,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.next_target_index.is_some()
    }
}

impl MotionState {
    /// A closed sheet in a container of `closed_position` height
    pub fn new(closed_position: f32) -> Self {
        Self {
            position: SharedScalar::new(closed_position),
            index: SharedScalar::new(CLOSED_INDEX as f32),
            next_target_index: SharedScalar::new(UNSET),
            current_index: SharedScalar::new(CLOSED_INDEX as f32),
            gesture_active: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn position(&self) -> f32 {
        self.position.get()
    }

    /// Fractional while moving between snap points
    pub fn index(&self) -> f32 {
        self.index.get()
    }

    /// Index of the snap point being animated toward, `None` at rest
    pub fn next_target_index(&self) -> Option<f32> {
        let value = self.next_target_index.get();
        (value != UNSET).then_some(value)
    }

    /// Index of the last completed settle
    pub fn current_index(&self) -> i32 {
        self.current_index.get() as i32
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture_active.load(Ordering::Acquire)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Read every value once
    ///
    /// Each value is read atomically, but not together: racing a writer on
    /// another thread may pair a new position with the previous index. Use
    /// `SheetController::snapshot` when the values must agree.
    pub fn snapshot(&self) -> MotionSnapshot {
        MotionSnapshot {
            position: self.position(),
            index: self.index(),
            next_target_index: self.next_target_index(),
            current_index: self.current_index(),
            gesture_active: self.is_gesture_active(),
        }
    }

    /// Versions of (position, index, next target, committed index)
    pub fn versions(&self) -> [u64; 4] {
        [
            self.position.version(),
            self.index.version(),
            self.next_target_index.version(),
            self.current_index.version(),
        ]
    }

    // =========================================================================
    // Writers (controller only)
    // =========================================================================

    pub(crate) fn set_position(&self, position: f32, index: f32) {
        self.position.set(position);
        self.index.set(index);
    }

    pub(crate) fn set_next_target(&self, index: Option<i32>) {
        self.next_target_index
            .set(index.map(|i| i as f32).unwrap_or(UNSET));
    }

    /// Returns `true` when the committed index changed
    pub(crate) fn commit_index(&self, index: i32) -> bool {
        self.current_index.set(index as f32)
    }

    pub(crate) fn set_gesture_active(&self, active: bool) {
        self.gesture_active.store(active, Ordering::Release);
    }

    pub(crate) fn mark_disposed(&self) {
        self.disposed.store(true, Ordering::Release);
        self.gesture_active.store(false, Ordering::Release);
    }
}
