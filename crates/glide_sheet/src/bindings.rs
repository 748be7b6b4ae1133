//! Collaborator bindings
//!
//! Scrollable lists and plain content views rendered inside a sheet attach
//! through these types. Attaching without a live sheet is a usage error and
//! fails immediately. Dropping a binding removes its height contribution.

use crate::content::{ContentRegion, HeightReport};
use crate::controller::{ScrollableId, SheetHandle};
use crate::error::{Result, SheetError};
use crate::scroll_lock::{DragOwner, ScrollLockMode};

/// Kind of nested scrollable
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScrollableKind {
    View,
    ScrollView,
    FlatList,
    SectionList,
    FlashList,
}

impl ScrollableKind {
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            ScrollableKind::FlatList | ScrollableKind::SectionList | ScrollableKind::FlashList
        )
    }
}

/// How the sheet's pan gesture composes with a scrollable's own pan
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GestureToken {
    /// Both recognizers run at once
    pub simultaneous: bool,
    /// Leaving the scrollable's bounds does not cancel the drag
    pub cancel_when_outside: bool,
}

impl Default for GestureToken {
    fn default() -> Self {
        Self {
            simultaneous: true,
            cancel_when_outside: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollableOptions {
    /// Seeds the body height until the list reports a real content size
    pub estimated_height: Option<f32>,
    /// The scrollable's own indicator preference
    pub show_indicator: bool,
    /// Reserve room for the footer at the bottom of the content
    pub footer_margin_adjustment: bool,
    pub base_bottom_margin: f32,
}

impl Default for ScrollableOptions {
    fn default() -> Self {
        Self {
            estimated_height: None,
            show_indicator: true,
            footer_margin_adjustment: false,
            base_bottom_margin: 0.0,
        }
    }
}

/// Current props for a scrollable
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollableProps {
    pub mode: ScrollLockMode,
    pub deceleration_rate: f32,
    pub show_indicator: bool,
    pub bottom_margin: f32,
    /// This scrollable receives the sheet's drag hand-off
    pub active: bool,
}

/// A scrollable attached to a sheet
#[derive(Debug)]
pub struct ScrollableBinding {
    sheet: SheetHandle,
    id: ScrollableId,
    kind: ScrollableKind,
    options: ScrollableOptions,
}

impl ScrollableBinding {
    pub fn attach(
        sheet: Option<&SheetHandle>,
        kind: ScrollableKind,
        options: ScrollableOptions,
    ) -> Result<Self> {
        let handle = sheet.ok_or(SheetError::OutsideSheet("scrollable"))?;
        let shared = handle
            .upgrade()
            .ok_or(SheetError::OutsideSheet("scrollable"))?;

        let id = shared.register_scrollable(kind);
        if let Some(estimate) = options.estimated_height {
            shared.seed_region(ContentRegion::Body, estimate);
        }
        Ok(Self {
            sheet: handle.clone(),
            id,
            kind,
            options,
        })
    }

    pub fn kind(&self) -> ScrollableKind {
        self.kind
    }

    pub fn gesture_token(&self) -> GestureToken {
        GestureToken::default()
    }

    pub fn props(&self) -> Option<ScrollableProps> {
        let shared = self.sheet.upgrade()?;
        let behavior = shared.scroll_behavior();
        Some(ScrollableProps {
            mode: behavior.mode,
            deceleration_rate: behavior.deceleration_rate,
            show_indicator: self.options.show_indicator && behavior.show_indicator,
            bottom_margin: shared.footer_margin(
                self.options.base_bottom_margin,
                self.options.footer_margin_adjustment,
            ),
            active: shared
                .active_scrollable()
                .is_some_and(|(id, _)| id == self.id),
        })
    }

    /// Forward a content size change into the body height
    pub fn on_content_size_changed(&self, _width: f32, height: f32) -> Option<HeightReport> {
        self.sheet
            .report_content_height(ContentRegion::Body, height)
    }

    pub fn on_scroll(&self, offset: f32) {
        if let Some(shared) = self.sheet.upgrade() {
            shared.set_scroll_offset(self.id, offset);
        }
    }

    /// Who should move for a drag of `translation_y` starting on this content
    pub fn drag_owner(&self, translation_y: f32) -> DragOwner {
        self.sheet
            .upgrade()
            .map_or(DragOwner::Scrollable, |shared| {
                shared.scroll_drag_owner(self.id, translation_y)
            })
    }
}

impl Drop for ScrollableBinding {
    fn drop(&mut self) {
        if let Some(shared) = self.sheet.upgrade() {
            shared.unregister_scrollable(self.id);
            shared.evict_region(ContentRegion::Body);
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContentRegionOptions {
    pub footer_margin_adjustment: bool,
    pub base_bottom_margin: f32,
}

/// A plain view (handle, body, or footer) reporting its layout height
#[derive(Debug)]
pub struct ContentRegionBinding {
    sheet: SheetHandle,
    region: ContentRegion,
    options: ContentRegionOptions,
}

impl ContentRegionBinding {
    pub fn attach(
        sheet: Option<&SheetHandle>,
        region: ContentRegion,
        options: ContentRegionOptions,
    ) -> Result<Self> {
        let handle = sheet
            .filter(|handle| handle.is_alive())
            .ok_or(SheetError::OutsideSheet("content region"))?;
        Ok(Self {
            sheet: handle.clone(),
            region,
            options,
        })
    }

    pub fn region(&self) -> ContentRegion {
        self.region
    }

    pub fn on_layout(&self, height: f32) -> Option<HeightReport> {
        self.sheet.report_content_height(self.region, height)
    }

    pub fn footer_margin(&self) -> f32 {
        self.sheet
            .upgrade()
            .map_or(self.options.base_bottom_margin, |shared| {
                shared.footer_margin(
                    self.options.base_bottom_margin,
                    self.options.footer_margin_adjustment,
                )
            })
    }
}

impl Drop for ContentRegionBinding {
    fn drop(&mut self) {
        if let Some(shared) = self.sheet.upgrade() {
            shared.evict_region(self.region);
        }
    }
}
