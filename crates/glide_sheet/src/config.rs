//! Sheet configuration
//!
//! Every knob of a sheet lives in [`SheetConfig`]. Configs are plain data:
//! they deserialize from TOML, can be built in code with the builder-style
//! setters, and are checked once by [`SheetConfig::validate`] before a
//! controller accepts them.
//!
//! ```toml
//! snap_points = ["25%", "50%", "90%"]
//! initial_index = 1
//! enable_pan_down_to_close = true
//!
//! [animation]
//! type = "spring"
//! stiffness = 500.0
//! damping = 44.7
//!
//! [backdrop]
//! opacity = 0.6
//! appears_on_index = 2
//! press_behavior = "collapse"
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use glide_animation::{Easing, SpringConfig, DEFAULT_DECELERATION_RATE};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SheetError};

// =============================================================================
// Snap points
// =============================================================================

/// A configured rest height of the sheet
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnapPointRepr", into = "SnapPointRepr")]
pub enum SnapPoint {
    /// Absolute sheet height in layout units
    Fixed(f32),
    /// Percentage (0-100) of the container height
    Percent(f32),
}

impl SnapPoint {
    /// Sheet height this point describes for a container of `container_height`
    pub fn height(&self, container_height: f32) -> f32 {
        match *self {
            SnapPoint::Fixed(height) => height,
            SnapPoint::Percent(percent) => container_height * percent / 100.0,
        }
    }

    fn raw(&self) -> f32 {
        match *self {
            SnapPoint::Fixed(v) | SnapPoint::Percent(v) => v,
        }
    }

    fn same_unit(&self, other: &SnapPoint) -> bool {
        matches!(
            (self, other),
            (SnapPoint::Fixed(_), SnapPoint::Fixed(_)) | (SnapPoint::Percent(_), SnapPoint::Percent(_))
        )
    }
}

impl FromStr for SnapPoint {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let parse = |text: &str| {
            text.trim()
                .parse::<f32>()
                .map_err(|_| SheetError::SnapPointParse(s.to_string()))
        };
        match trimmed.strip_suffix('%') {
            Some(percent) => parse(percent).map(SnapPoint::Percent),
            None => parse(trimmed).map(SnapPoint::Fixed),
        }
    }
}

impl fmt::Display for SnapPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapPoint::Fixed(v) => write!(f, "{v}"),
            SnapPoint::Percent(v) => write!(f, "{v}%"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SnapPointRepr {
    Number(f32),
    Text(String),
}

impl TryFrom<SnapPointRepr> for SnapPoint {
    type Error = SheetError;

    fn try_from(repr: SnapPointRepr) -> Result<Self> {
        match repr {
            SnapPointRepr::Number(v) => Ok(SnapPoint::Fixed(v)),
            SnapPointRepr::Text(text) => text.parse(),
        }
    }
}

impl From<SnapPoint> for SnapPointRepr {
    fn from(point: SnapPoint) -> Self {
        match point {
            SnapPoint::Fixed(v) => SnapPointRepr::Number(v),
            SnapPoint::Percent(_) => SnapPointRepr::Text(point.to_string()),
        }
    }
}

// =============================================================================
// Animation
// =============================================================================

/// How settle transitions move the sheet
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimationConfig {
    /// Physically modeled; inherits the release velocity
    Spring(SpringConfig),
    /// Fixed duration with an easing curve
    Timing {
        #[serde(default = "default_timing_duration")]
        duration_ms: f32,
        #[serde(default = "default_timing_easing")]
        easing: Easing,
    },
}

fn default_timing_duration() -> f32 {
    250.0
}

fn default_timing_easing() -> Easing {
    Easing::EaseOutExpo
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig::Spring(SpringConfig::sheet())
    }
}

impl AnimationConfig {
    pub fn timing(duration_ms: f32) -> Self {
        AnimationConfig::Timing {
            duration_ms,
            easing: default_timing_easing(),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            AnimationConfig::Spring(spring) if !spring.is_valid() => Err(
                SheetError::InvalidAnimation(format!("spring parameters must be positive: {spring:?}")),
            ),
            AnimationConfig::Timing { duration_ms, .. }
                if !duration_ms.is_finite() || *duration_ms < 0.0 =>
            {
                Err(SheetError::InvalidAnimation(format!(
                    "timing duration must be a non-negative number, got {duration_ms}"
                )))
            }
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Gesture
// =============================================================================

/// Release classification and overdrag feel
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Below this speed (units/s) a release snaps to the nearest point
    pub velocity_threshold: f32,
    /// Per-millisecond velocity retention used for ballistic projection
    pub deceleration_rate: f32,
    /// Rubber-band stiffness past the first/last snap point
    pub overdrag_resistance: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            velocity_threshold: 50.0,
            deceleration_rate: DEFAULT_DECELERATION_RATE,
            overdrag_resistance: 0.55,
        }
    }
}

impl GestureConfig {
    fn validate(&self) -> Result<()> {
        if !self.velocity_threshold.is_finite() || self.velocity_threshold < 0.0 {
            return Err(SheetError::InvalidGesture(format!(
                "velocity_threshold must be non-negative, got {}",
                self.velocity_threshold
            )));
        }
        if !(0.0..1.0).contains(&self.deceleration_rate) {
            return Err(SheetError::InvalidGesture(format!(
                "deceleration_rate must be in [0, 1), got {}",
                self.deceleration_rate
            )));
        }
        if !self.overdrag_resistance.is_finite() || self.overdrag_resistance <= 0.0 {
            return Err(SheetError::InvalidGesture(format!(
                "overdrag_resistance must be positive, got {}",
                self.overdrag_resistance
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Content and scroll lock
// =============================================================================

/// Dynamic sizing input filtering
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Height changes smaller than this are treated as layout noise
    pub height_epsilon: f32,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            height_epsilon: 10.0,
        }
    }
}

/// Nested scroll ownership
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollLockConfig {
    /// Locked while index <= this; `None` unlocks only at the top snap point
    pub collapse_threshold: Option<i32>,
    /// Hide the scroll indicator of nested content entirely
    pub hide_indicator: bool,
}

// =============================================================================
// Backdrop
// =============================================================================

/// What a tap on the backdrop does
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PressBehaviorRepr", into = "PressBehaviorRepr")]
pub enum PressBehavior {
    /// Close the sheet
    #[default]
    Close,
    /// Snap to the backdrop's disappear index
    Collapse,
    /// Snap to an explicit index
    SnapTo(i32),
    /// Taps do nothing
    None,
}

impl fmt::Display for PressBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PressBehavior::Close => f.write_str("close"),
            PressBehavior::Collapse => f.write_str("collapse"),
            PressBehavior::SnapTo(index) => write!(f, "{index}"),
            PressBehavior::None => f.write_str("none"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PressBehaviorRepr {
    Index(i32),
    Named(String),
}

impl TryFrom<PressBehaviorRepr> for PressBehavior {
    type Error = SheetError;

    fn try_from(repr: PressBehaviorRepr) -> Result<Self> {
        match repr {
            PressBehaviorRepr::Index(index) => Ok(PressBehavior::SnapTo(index)),
            PressBehaviorRepr::Named(name) => match name.as_str() {
                "close" => Ok(PressBehavior::Close),
                "collapse" => Ok(PressBehavior::Collapse),
                "none" => Ok(PressBehavior::None),
                other => Err(SheetError::InvalidBackdrop(format!(
                    "unknown press behavior '{other}'"
                ))),
            },
        }
    }
}

impl From<PressBehavior> for PressBehaviorRepr {
    fn from(behavior: PressBehavior) -> Self {
        match behavior {
            PressBehavior::SnapTo(index) => PressBehaviorRepr::Index(index),
            other => PressBehaviorRepr::Named(other.to_string()),
        }
    }
}

/// Dimming layer behind the sheet
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropConfig {
    /// Opacity reached at `appears_on_index`
    pub opacity: f32,
    pub appears_on_index: i32,
    pub disappears_on_index: i32,
    /// Backdrop never intercepts touches
    pub enable_touch_through: bool,
    pub press_behavior: PressBehavior,
    /// `false` renders a constant `opacity` regardless of index
    pub animated: bool,
    /// Drive opacity from a timed index that heads for the next target
    pub paced_index: bool,
    pub paced_duration_ms: f32,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            opacity: 0.5,
            appears_on_index: 1,
            disappears_on_index: 0,
            enable_touch_through: false,
            press_behavior: PressBehavior::Close,
            animated: true,
            paced_index: false,
            paced_duration_ms: 300.0,
        }
    }
}

impl BackdropConfig {
    pub fn press_behavior(mut self, behavior: PressBehavior) -> Self {
        self.press_behavior = behavior;
        self
    }

    pub fn range(mut self, disappears_on_index: i32, appears_on_index: i32) -> Self {
        self.disappears_on_index = disappears_on_index;
        self.appears_on_index = appears_on_index;
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn paced(mut self, duration_ms: f32) -> Self {
        self.paced_index = true;
        self.paced_duration_ms = duration_ms;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(SheetError::InvalidBackdrop(format!(
                "opacity must be in [0, 1], got {}",
                self.opacity
            )));
        }
        if self.disappears_on_index < -1 {
            return Err(SheetError::InvalidBackdrop(format!(
                "disappears_on_index must be >= -1, got {}",
                self.disappears_on_index
            )));
        }
        if self.appears_on_index <= self.disappears_on_index {
            return Err(SheetError::InvalidBackdrop(format!(
                "appears_on_index ({}) must be above disappears_on_index ({})",
                self.appears_on_index, self.disappears_on_index
            )));
        }
        if let PressBehavior::SnapTo(index) = self.press_behavior {
            if index < -1 {
                return Err(SheetError::InvalidBackdrop(format!(
                    "press behavior index must be >= -1, got {index}"
                )));
            }
        }
        if !self.paced_duration_ms.is_finite() || self.paced_duration_ms < 0.0 {
            return Err(SheetError::InvalidBackdrop(format!(
                "paced_duration_ms must be non-negative, got {}",
                self.paced_duration_ms
            )));
        }
        Ok(())
    }
}

// =============================================================================
// SheetConfig
// =============================================================================

/// Complete configuration of one sheet
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Rest heights, ascending
    pub snap_points: Vec<SnapPoint>,
    /// Index to settle at after the first layout; -1 starts closed
    pub initial_index: i32,
    /// Add a snap point derived from measured content height
    pub enable_dynamic_sizing: bool,
    /// Cap for the content-derived snap point
    pub max_dynamic_content_size: Option<f32>,
    /// Release below the first snap point may close the sheet
    pub enable_pan_down_to_close: bool,
    /// Rubber-band past the outer snap points instead of hard clamping
    pub enable_over_drag: bool,
    pub gesture: GestureConfig,
    pub animation: AnimationConfig,
    pub content: ContentConfig,
    pub scroll_lock: ScrollLockConfig,
    pub backdrop: Option<BackdropConfig>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            snap_points: Vec::new(),
            initial_index: 0,
            enable_dynamic_sizing: false,
            max_dynamic_content_size: None,
            enable_pan_down_to_close: false,
            enable_over_drag: true,
            gesture: GestureConfig::default(),
            animation: AnimationConfig::default(),
            content: ContentConfig::default(),
            scroll_lock: ScrollLockConfig::default(),
            backdrop: None,
        }
    }
}

impl SheetConfig {
    pub fn new(snap_points: impl IntoIterator<Item = SnapPoint>) -> Self {
        Self {
            snap_points: snap_points.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: SheetConfig =
            toml::from_str(source).map_err(|e| SheetError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| SheetError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SheetError::ConfigParse(e.to_string()))
    }

    // =========================================================================
    // Builder
    // =========================================================================

    pub fn initial_index(mut self, index: i32) -> Self {
        self.initial_index = index;
        self
    }

    pub fn dynamic_sizing(mut self, enabled: bool) -> Self {
        self.enable_dynamic_sizing = enabled;
        self
    }

    pub fn max_dynamic_content_size(mut self, max: f32) -> Self {
        self.max_dynamic_content_size = Some(max);
        self
    }

    pub fn pan_down_to_close(mut self, enabled: bool) -> Self {
        self.enable_pan_down_to_close = enabled;
        self
    }

    pub fn over_drag(mut self, enabled: bool) -> Self {
        self.enable_over_drag = enabled;
        self
    }

    pub fn animation(mut self, animation: AnimationConfig) -> Self {
        self.animation = animation;
        self
    }

    pub fn backdrop(mut self, backdrop: BackdropConfig) -> Self {
        self.backdrop = Some(backdrop);
        self
    }

    pub fn collapse_threshold(mut self, threshold: i32) -> Self {
        self.scroll_lock.collapse_threshold = Some(threshold);
        self
    }

    pub fn height_epsilon(mut self, epsilon: f32) -> Self {
        self.content.height_epsilon = epsilon;
        self
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Reject configurations the state machine cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.snap_points.is_empty() && !self.enable_dynamic_sizing {
            return Err(SheetError::EmptySnapPoints);
        }

        for (index, point) in self.snap_points.iter().enumerate() {
            let value = point.raw();
            if !value.is_finite() || value < 0.0 {
                return Err(SheetError::InvalidSnapPoint {
                    index,
                    reason: format!("{point} must be a non-negative number"),
                });
            }
            if let SnapPoint::Percent(percent) = point {
                if *percent > 100.0 {
                    return Err(SheetError::InvalidSnapPoint {
                        index,
                        reason: format!("{point} exceeds 100%"),
                    });
                }
            }
        }

        // Mixed units are only comparable once the container is measured;
        // same-unit pairs must already be strictly ascending.
        for (index, point) in self.snap_points.iter().enumerate() {
            for (previous, earlier) in self.snap_points[..index].iter().enumerate() {
                if earlier.same_unit(point) && earlier.raw() >= point.raw() {
                    return Err(SheetError::NonMonotonicSnapPoints { index, previous });
                }
            }
        }

        // Dynamic sizing may add one content-derived point at runtime
        let max_len = self.snap_points.len() + usize::from(self.enable_dynamic_sizing);
        if self.initial_index < -1 || self.initial_index >= max_len as i32 {
            return Err(SheetError::InvalidInitialIndex {
                index: self.initial_index,
                len: max_len,
            });
        }

        if let Some(max) = self.max_dynamic_content_size {
            if !max.is_finite() || max <= 0.0 {
                return Err(SheetError::InvalidSnapPoint {
                    index: self.snap_points.len(),
                    reason: format!("max_dynamic_content_size must be positive, got {max}"),
                });
            }
        }

        if !self.content.height_epsilon.is_finite() || self.content.height_epsilon < 0.0 {
            return Err(SheetError::InvalidThreshold(format!(
                "height_epsilon must be non-negative, got {}",
                self.content.height_epsilon
            )));
        }

        if let Some(threshold) = self.scroll_lock.collapse_threshold {
            if threshold < -1 {
                return Err(SheetError::InvalidThreshold(format!(
                    "collapse_threshold must be >= -1, got {threshold}"
                )));
            }
        }

        self.gesture.validate()?;
        self.animation.validate()?;
        if let Some(backdrop) = &self.backdrop {
            backdrop.validate()?;
        }
        Ok(())
    }
}
