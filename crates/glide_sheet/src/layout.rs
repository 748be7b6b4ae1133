//! Container measurement
//!
//! The host reports the height of the area the sheet lives in and where that
//! area sits on screen. Snap positions are computed relative to the
//! container; [`ContainerLayout::absolute`] maps them back to screen space.

use serde::{Deserialize, Serialize};

/// Screen-space offsets of the container, accounting for system chrome
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Insets {
    pub top: f32,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Measured container geometry
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerLayout {
    pub height: f32,
    #[serde(default)]
    pub offset: Insets,
}

impl ContainerLayout {
    pub fn new(height: f32) -> Self {
        Self {
            height: sanitize(height),
            offset: Insets::default(),
        }
    }

    pub fn with_offset(mut self, offset: Insets) -> Self {
        self.offset = offset;
        self
    }

    /// Build from a raw measurement of the container view
    ///
    /// `page_y` is the container's top edge in window coordinates; the bottom
    /// offset is whatever window height remains below the container and the
    /// status bar.
    pub fn from_measurement(
        height: f32,
        page_y: f32,
        window_height: f32,
        status_bar_height: f32,
    ) -> Self {
        let height = sanitize(height);
        let top = sanitize(page_y);
        let bottom = (window_height - (top + height + sanitize(status_bar_height))).max(0.0);
        Self {
            height,
            offset: Insets {
                top,
                left: 0.0,
                right: 0.0,
                bottom,
            },
        }
    }

    /// A zero-height container cannot host snap points yet
    pub fn is_measured(&self) -> bool {
        self.height > 0.0
    }

    /// Container-relative position to screen-space y
    pub fn absolute(&self, position: f32) -> f32 {
        self.offset.top + position
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_derives_bottom_offset() {
        let layout = ContainerLayout::from_measurement(700.0, 44.0, 812.0, 24.0);
        assert_eq!(layout.height, 700.0);
        assert_eq!(layout.offset.top, 44.0);
        assert_eq!(layout.offset.bottom, 44.0);
        assert_eq!(layout.absolute(100.0), 144.0);
    }

    #[test]
    fn test_measurement_never_negative() {
        let layout = ContainerLayout::from_measurement(900.0, 0.0, 812.0, 0.0);
        assert_eq!(layout.offset.bottom, 0.0);

        let bogus = ContainerLayout::new(f32::NAN);
        assert!(!bogus.is_measured());
    }
}
