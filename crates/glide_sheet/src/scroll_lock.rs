//! Nested scroll ownership
//!
//! While the sheet is below its top snap point a drag on nested content
//! moves the sheet, and the content itself stays put (locked). Once the
//! index passes the collapse threshold the content scrolls freely and only
//! hands the drag back to the sheet when pulled down from its top edge.
//!
//! ```text
//!   index <= threshold ──► LOCKED    deceleration 0, indicator hidden
//!   index >  threshold ──► UNLOCKED  native deceleration, indicator shown
//! ```
//!
//! The mode is a pure function of the index. [`ScrollLock`] only remembers
//! the last published mode so notifications fire on edges.

use serde::{Deserialize, Serialize};

use crate::config::ScrollLockConfig;
use crate::snap::{SnapTable, CLOSED_INDEX};

/// Deceleration handed to locked content so it stops immediately
pub const LOCKED_DECELERATION_RATE: f32 = 0.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollLockMode {
    Locked,
    Unlocked,
}

/// Who moves in response to a vertical drag over nested content
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragOwner {
    Sheet,
    Scrollable,
}

/// What nested scrollables are told to do
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollBehavior {
    pub mode: ScrollLockMode,
    pub deceleration_rate: f32,
    pub show_indicator: bool,
}

/// Default threshold: unlocked only at the top snap point
pub fn default_threshold(table: &SnapTable) -> i32 {
    (table.highest_index() - 1).max(CLOSED_INDEX)
}

/// Mode for an index under a threshold
pub fn mode_for_index(index: f32, threshold: i32) -> ScrollLockMode {
    if index <= threshold as f32 {
        ScrollLockMode::Locked
    } else {
        ScrollLockMode::Unlocked
    }
}

#[derive(Clone, Debug)]
pub struct ScrollLock {
    threshold: Option<i32>,
    hide_indicator: bool,
    unlocked_deceleration: f32,
    published: ScrollLockMode,
}

impl ScrollLock {
    pub fn new(config: &ScrollLockConfig, unlocked_deceleration: f32) -> Self {
        Self {
            threshold: config.collapse_threshold,
            hide_indicator: config.hide_indicator,
            unlocked_deceleration,
            published: ScrollLockMode::Locked,
        }
    }

    pub fn threshold(&self, table: &SnapTable) -> i32 {
        self.threshold
            .unwrap_or_else(|| default_threshold(table))
    }

    /// Pure evaluation
    pub fn evaluate(&self, index: f32, table: &SnapTable) -> ScrollLockMode {
        mode_for_index(index, self.threshold(table))
    }

    /// Re-evaluate and return the new mode only if it changed
    pub fn update(&mut self, index: f32, table: &SnapTable) -> Option<ScrollLockMode> {
        let mode = self.evaluate(index, table);
        if mode == self.published {
            return None;
        }
        tracing::debug!("scroll lock {:?} -> {:?} at index {:.2}", self.published, mode, index);
        self.published = mode;
        Some(mode)
    }

    pub fn mode(&self) -> ScrollLockMode {
        self.published
    }

    pub fn behavior(&self) -> ScrollBehavior {
        let mode = self.published;
        ScrollBehavior {
            mode,
            deceleration_rate: match mode {
                ScrollLockMode::Locked => LOCKED_DECELERATION_RATE,
                ScrollLockMode::Unlocked => self.unlocked_deceleration,
            },
            show_indicator: !self.hide_indicator && mode == ScrollLockMode::Unlocked,
        }
    }
}

/// Decide who handles a drag over nested content
///
/// `scroll_offset` is the content's own offset (0 at its top edge);
/// `translation_y` is positive when the finger moves down.
pub fn drag_owner(mode: ScrollLockMode, scroll_offset: f32, translation_y: f32) -> DragOwner {
    match mode {
        ScrollLockMode::Locked => DragOwner::Sheet,
        ScrollLockMode::Unlocked if translation_y > 0.0 && scroll_offset <= 0.0 => DragOwner::Sheet,
        ScrollLockMode::Unlocked => DragOwner::Scrollable,
    }
}
