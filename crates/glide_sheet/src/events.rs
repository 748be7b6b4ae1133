//! Commands accepted by a sheet and events it emits

use crate::backdrop::PointerEvents;
use crate::scroll_lock::ScrollLockMode;

/// Identifies one settle transition
///
/// Every programmatic command and every gesture release yields exactly one
/// id, and each id is later reported exactly once in
/// [`SheetEvent::TransitionFinished`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(pub(crate) u64);

impl TransitionId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Programmatic navigation
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SheetCommand {
    SnapToIndex(i32),
    SnapToPosition(f32),
    /// Highest snap point
    Expand,
    /// Lowest snap point
    Collapse,
    Close,
}

/// Why a settle transition started
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettleReason {
    /// First settle after the container was measured
    Mount,
    /// Finger lifted
    Release,
    /// Gesture cancelled by the system
    Cancel,
    /// Programmatic command
    Command,
    /// Snap table recomputed under a resting sheet
    TableChanged,
}

/// How a transition ended
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionOutcome {
    /// Reached its target and committed `index`
    Settled { index: i32, position: f32 },
    /// Discarded in favour of a newer gesture or command
    Interrupted,
    /// The sheet was torn down first
    Disposed,
}

/// Notifications emitted by a sheet
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SheetEvent {
    TransitionStarted {
        id: TransitionId,
        target_index: i32,
        target_position: f32,
        reason: SettleReason,
    },
    TransitionFinished {
        id: TransitionId,
        outcome: TransitionOutcome,
    },
    /// Committed index changed (fires after `TransitionFinished`)
    IndexCommitted { index: i32 },
    /// A new snap table was published
    SnapTableChanged { version: u64, len: usize },
    ScrollLockChanged { mode: ScrollLockMode },
    BackdropPointerEvents { pointer_events: PointerEvents },
    /// A backdrop tap is about to dispatch its command
    BackdropPressed { command: SheetCommand },
}
