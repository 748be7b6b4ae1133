//! Glide Bottom Sheet
//!
//! A snap-point bottom sheet as a headless state machine. The host renders;
//! this crate decides where the sheet is.
//!
//! # Features
//!
//! - **Snap Tables**: fixed and percentage snap points resolved against the
//!   measured container, plus an optional content-derived point
//! - **Gestures**: pan tracking with rubber-band overdrag and ballistic
//!   release classification
//! - **Settle Animations**: spring or timed transitions that can be
//!   interrupted and retargeted without jumps
//! - **Dynamic Sizing**: versioned content-height snapshots with noise
//!   filtering
//! - **Dependent Visuals**: scroll lock, backdrop opacity and touch handling,
//!   footer margin, all derived from one motion snapshot
//!
//! # Example
//!
//! ```rust
//! use glide_sheet::{ContainerLayout, GestureEvent, SheetConfig, SheetController};
//!
//! let config = SheetConfig::from_toml_str(r#"snap_points = ["25%", "50%", "90%"]"#).unwrap();
//! let sheet = SheetController::new("home", config).unwrap();
//! sheet.set_layout(ContainerLayout::new(800.0));
//!
//! sheet.handle_gesture(GestureEvent::Begin { timestamp_ms: 0.0 });
//! sheet.handle_gesture(GestureEvent::End {
//!     translation_y: -280.0,
//!     velocity_y: Some(-2000.0),
//!     timestamp_ms: 120.0,
//! });
//! while sheet.tick(1.0 / 60.0) {}
//!
//! assert_eq!(sheet.snapshot().current_index, 2);
//! ```

pub mod backdrop;
pub mod bindings;
pub mod config;
pub mod content;
pub mod controller;
pub mod error;
pub mod events;
pub mod footer;
pub mod gesture;
pub mod layout;
pub mod motion;
pub mod registry;
pub mod resolver;
pub mod scroll_lock;
pub mod snap;

mod settle;

#[cfg(test)]
mod scenarios;

pub use backdrop::{backdrop_opacity, BackdropFrame, BackdropReactor, PacedIndex, PointerEvents};
pub use bindings::{
    ContentRegionBinding, ContentRegionOptions, GestureToken, ScrollableBinding, ScrollableKind,
    ScrollableOptions, ScrollableProps,
};
pub use config::{
    AnimationConfig, BackdropConfig, ContentConfig, GestureConfig, PressBehavior, ScrollLockConfig,
    SheetConfig, SnapPoint,
};
pub use content::{
    ContentHeightAggregator, ContentRegion, ContentSnapshot, HeightReport, InstanceKey,
};
pub use controller::{ScrollableId, SheetController, SheetFrame, SheetHandle};
pub use error::{Result, SheetError};
pub use events::{SettleReason, SheetCommand, SheetEvent, TransitionId, TransitionOutcome};
pub use footer::footer_margin;
pub use gesture::{DragBounds, GestureEvent};
pub use layout::{ContainerLayout, Insets};
pub use motion::{MotionSnapshot, MotionState};
pub use registry::{SheetId, SheetRegistry};
pub use resolver::{Resolution, SnapResolver, SnapTarget};
pub use scroll_lock::{DragOwner, ScrollBehavior, ScrollLock, ScrollLockMode};
pub use snap::{SnapTable, CLOSED_INDEX};
