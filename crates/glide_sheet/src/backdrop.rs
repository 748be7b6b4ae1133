//! Backdrop reactor
//!
//! Opacity and touch handling of the dimming layer are derived from the
//! motion snapshot every frame:
//!
//! - opacity interpolates the index over `[-1, disappear, appear]` to
//!   `[0, 0, opacity]`, clamped outside
//! - pointer events are off while `index <= disappear` (or always, with
//!   touch-through), published only when they flip
//! - a tap dispatches exactly one command, never during a drag and never
//!   while the previous tap's transition is still running

use glide_animation::{interpolate, Easing, Extrapolate, Tween};

use crate::config::{BackdropConfig, PressBehavior};
use crate::events::{SheetCommand, TransitionId};
use crate::motion::MotionSnapshot;
use crate::snap::CLOSED_INDEX;

/// Whether the backdrop intercepts touches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEvents {
    Auto,
    None,
}

/// Backdrop opacity for an index
pub fn backdrop_opacity(index: f32, config: &BackdropConfig) -> f32 {
    if !config.animated {
        return config.opacity;
    }
    interpolate(
        index,
        &[
            CLOSED_INDEX as f32,
            config.disappears_on_index as f32,
            config.appears_on_index as f32,
        ],
        &[0.0, 0.0, config.opacity],
        Extrapolate::Clamp,
    )
}

pub fn pointer_events(index: f32, config: &BackdropConfig) -> PointerEvents {
    if config.enable_touch_through || index <= config.disappears_on_index as f32 {
        PointerEvents::None
    } else {
        PointerEvents::Auto
    }
}

/// Command a tap dispatches under a press behavior
pub fn press_command(behavior: PressBehavior, config: &BackdropConfig) -> Option<SheetCommand> {
    match behavior {
        PressBehavior::Close => Some(SheetCommand::Close),
        PressBehavior::Collapse => Some(SheetCommand::SnapToIndex(config.disappears_on_index)),
        PressBehavior::SnapTo(index) => Some(SheetCommand::SnapToIndex(index)),
        PressBehavior::None => None,
    }
}

/// Timed index that heads for the next target instead of following the
/// literal position-derived index
#[derive(Clone, Debug)]
pub struct PacedIndex {
    tween: Tween,
    duration_ms: f32,
}

impl PacedIndex {
    pub fn new(initial: f32, duration_ms: f32) -> Self {
        Self {
            tween: Tween::at_rest(initial),
            duration_ms,
        }
    }

    pub fn value(&self) -> f32 {
        self.tween.value()
    }

    /// Follow `next_target_index`, or the committed index at rest
    pub fn update(&mut self, snapshot: &MotionSnapshot, dt_ms: f32) -> f32 {
        let goal = snapshot
            .next_target_index
            .unwrap_or(snapshot.current_index as f32);
        if goal != self.tween.target() {
            self.tween = Tween::new(self.tween.value(), goal, self.duration_ms, Easing::EaseOutCubic);
        }
        self.tween.tick(dt_ms);
        self.tween.value()
    }
}

/// Derived backdrop state for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackdropFrame {
    pub opacity: f32,
    pub pointer_events: PointerEvents,
}

#[derive(Clone, Debug)]
pub struct BackdropReactor {
    config: BackdropConfig,
    paced: Option<PacedIndex>,
    published_pointer_events: PointerEvents,
    in_flight: Option<TransitionId>,
    frame: BackdropFrame,
}

impl BackdropReactor {
    pub fn new(config: BackdropConfig) -> Self {
        let closed = CLOSED_INDEX as f32;
        let pointer_events = pointer_events(closed, &config);
        Self {
            paced: config
                .paced_index
                .then(|| PacedIndex::new(closed, config.paced_duration_ms)),
            published_pointer_events: pointer_events,
            in_flight: None,
            frame: BackdropFrame {
                opacity: backdrop_opacity(closed, &config),
                pointer_events,
            },
            config,
        }
    }

    pub fn config(&self) -> &BackdropConfig {
        &self.config
    }

    pub fn frame(&self) -> BackdropFrame {
        self.frame
    }

    /// Recompute from a snapshot; returns new pointer events when they flip
    pub fn update(&mut self, snapshot: &MotionSnapshot, dt_ms: f32) -> Option<PointerEvents> {
        let opacity_index = match &mut self.paced {
            Some(paced) => paced.update(snapshot, dt_ms),
            None => snapshot.index,
        };
        let events = pointer_events(snapshot.index, &self.config);
        self.frame = BackdropFrame {
            opacity: backdrop_opacity(opacity_index, &self.config),
            pointer_events: events,
        };
        tracing::trace!("backdrop opacity {:.3}", self.frame.opacity);

        if events == self.published_pointer_events {
            return None;
        }
        self.published_pointer_events = events;
        Some(events)
    }

    /// Command for a tap, or `None` when the tap must be ignored
    pub fn tap(&self, snapshot: &MotionSnapshot) -> Option<SheetCommand> {
        if snapshot.gesture_active {
            tracing::debug!("backdrop tap ignored during drag");
            return None;
        }
        if pointer_events(snapshot.index, &self.config) == PointerEvents::None {
            return None;
        }
        if let Some(id) = self.in_flight {
            tracing::debug!("backdrop tap ignored; transition {} still running", id.raw());
            return None;
        }
        press_command(self.config.press_behavior, &self.config)
    }

    pub(crate) fn dispatched(&mut self, id: TransitionId) {
        self.in_flight = Some(id);
    }

    pub(crate) fn transition_finished(&mut self, id: TransitionId) {
        if self.in_flight == Some(id) {
            self.in_flight = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BackdropConfig {
        BackdropConfig::default().range(0, 2).opacity(0.8)
    }

    fn at(index: f32) -> MotionSnapshot {
        MotionSnapshot {
            index,
            ..MotionSnapshot::at_rest(index.round() as i32, 0.0)
        }
    }

    #[test]
    fn test_opacity_interpolates_between_thresholds() {
        let config = config();
        assert_eq!(backdrop_opacity(-1.0, &config), 0.0);
        assert_eq!(backdrop_opacity(-0.5, &config), 0.0);
        assert_eq!(backdrop_opacity(0.0, &config), 0.0);
        assert!((backdrop_opacity(1.0, &config) - 0.4).abs() < 1e-6);
        assert!((backdrop_opacity(1.5, &config) - 0.6).abs() < 1e-6);
        assert_eq!(backdrop_opacity(2.0, &config), 0.8);
        assert_eq!(backdrop_opacity(3.0, &config), 0.8);
    }

    #[test]
    fn test_static_backdrop_ignores_index() {
        let config = BackdropConfig {
            animated: false,
            ..config()
        };
        assert_eq!(backdrop_opacity(-1.0, &config), 0.8);
        assert_eq!(backdrop_opacity(2.0, &config), 0.8);
    }

    #[test]
    fn test_pointer_events_edge_triggered() {
        let mut reactor = BackdropReactor::new(config());
        assert_eq!(reactor.frame().pointer_events, PointerEvents::None);

        assert_eq!(reactor.update(&at(-0.5), 16.0), None);
        assert_eq!(reactor.update(&at(0.0), 16.0), None);
        assert_eq!(reactor.update(&at(0.2), 16.0), Some(PointerEvents::Auto));
        assert_eq!(reactor.update(&at(1.5), 16.0), None);
        assert_eq!(reactor.update(&at(0.0), 16.0), Some(PointerEvents::None));
    }

    #[test]
    fn test_touch_through_never_intercepts() {
        let config = BackdropConfig {
            enable_touch_through: true,
            ..config()
        };
        let mut reactor = BackdropReactor::new(config);
        assert_eq!(reactor.update(&at(2.0), 16.0), None);
        assert_eq!(reactor.tap(&at(2.0)), None);
    }

    #[test]
    fn test_press_behaviors() {
        let config = config();
        assert_eq!(press_command(PressBehavior::Close, &config), Some(SheetCommand::Close));
        assert_eq!(
            press_command(PressBehavior::Collapse, &config),
            Some(SheetCommand::SnapToIndex(0))
        );
        assert_eq!(
            press_command(PressBehavior::SnapTo(1), &config),
            Some(SheetCommand::SnapToIndex(1))
        );
        assert_eq!(press_command(PressBehavior::None, &config), None);
    }

    #[test]
    fn test_tap_blocked_while_dragging_or_in_flight() {
        let mut reactor = BackdropReactor::new(config().press_behavior(PressBehavior::Collapse));
        let dragging = MotionSnapshot {
            gesture_active: true,
            ..at(2.0)
        };
        assert_eq!(reactor.tap(&dragging), None);

        assert_eq!(reactor.tap(&at(2.0)), Some(SheetCommand::SnapToIndex(0)));
        reactor.dispatched(TransitionId(7));
        assert_eq!(reactor.tap(&at(1.8)), None);

        reactor.transition_finished(TransitionId(6));
        assert_eq!(reactor.tap(&at(1.8)), None);
        reactor.transition_finished(TransitionId(7));
        assert!(reactor.tap(&at(1.8)).is_some());
    }

    #[test]
    fn test_paced_index_heads_for_next_target() {
        let mut paced = PacedIndex::new(-1.0, 300.0);
        let moving = MotionSnapshot {
            index: -0.9,
            next_target_index: Some(2.0),
            ..MotionSnapshot::at_rest(-1, 800.0)
        };

        let mut value = paced.update(&moving, 150.0);
        assert!(value > -1.0 && value < 2.0);
        value = paced.update(&moving, 150.0);
        assert_eq!(value, 2.0);

        // Back at rest on the committed index
        let rest = MotionSnapshot::at_rest(1, 400.0);
        paced.update(&rest, 300.0);
        assert_eq!(paced.value(), 1.0);
    }
}
