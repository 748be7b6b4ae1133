//! Snap point table
//!
//! Positions are distances from the container top to the sheet's top edge.
//! Index 0 is the smallest sheet, so positions strictly descend as the index
//! grows. The closed sentinel (index -1) sits at the container height.
//!
//! ```text
//!   position 0 ─┬─ container top
//!               │
//!         80 ───┤  index 2  (90%)
//!               │
//!        400 ───┤  index 1  (50%)
//!        600 ───┤  index 0  (25%)
//!        800 ───┴─ index -1 (closed)
//! ```

use glide_animation::{interpolate, Extrapolate};
use smallvec::SmallVec;

use crate::config::SheetConfig;
use crate::layout::ContainerLayout;

/// Index of the closed sentinel
pub const CLOSED_INDEX: i32 = -1;

/// Positions closer than this are the same snap point
const DEDUP_EPSILON: f32 = 0.5;

/// Resolved snap positions for one container size and content height
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SnapTable {
    positions: SmallVec<[f32; 4]>,
    container_height: f32,
    dynamic_index: Option<usize>,
}

impl SnapTable {
    /// A table with no snap points, used until the container is measured
    pub fn empty(container_height: f32) -> Self {
        Self {
            positions: SmallVec::new(),
            container_height: container_height.max(0.0),
            dynamic_index: None,
        }
    }

    /// Build from explicit positions (any order); mainly for tests and tools
    pub fn from_positions(container_height: f32, positions: impl IntoIterator<Item = f32>) -> Self {
        let entries: SmallVec<[(f32, bool); 5]> = positions
            .into_iter()
            .map(|position| (position, false))
            .collect();
        Self::assemble(container_height, entries)
    }

    /// Resolve the configured points (and the content-derived point when
    /// dynamic sizing is on) against a measured container
    ///
    /// `content_height <= 0` means content has not been measured yet; the
    /// dynamic point is left out until it is.
    pub fn compute(config: &SheetConfig, layout: &ContainerLayout, content_height: f32) -> Self {
        if !layout.is_measured() {
            return Self::empty(0.0);
        }
        let container = layout.height;

        let mut entries: SmallVec<[(f32, bool); 5]> = config
            .snap_points
            .iter()
            .map(|point| {
                let height = point.height(container).clamp(0.0, container);
                (container - height, false)
            })
            .collect();

        if config.enable_dynamic_sizing && content_height > 0.0 {
            let cap = config
                .max_dynamic_content_size
                .unwrap_or(container)
                .min(container);
            let height = content_height.min(cap);
            entries.push((container - height, true));
        }

        Self::assemble(container, entries)
    }

    fn assemble(container_height: f32, mut entries: SmallVec<[(f32, bool); 5]>) -> Self {
        let container_height = container_height.max(0.0);
        entries.retain(|(position, _)| position.is_finite());
        for entry in entries.iter_mut() {
            entry.0 = entry.0.clamp(0.0, container_height);
        }

        let already_ordered = entries.windows(2).all(|pair| pair[0].0 > pair[1].0);
        if !already_ordered {
            tracing::debug!(
                "snap points out of order for container {}; sorting",
                container_height
            );
            entries.sort_by(|a, b| b.0.total_cmp(&a.0));
        }

        let mut positions: SmallVec<[f32; 4]> = SmallVec::new();
        let mut dynamic_index = None;
        for (position, dynamic) in entries {
            match positions.last() {
                Some(&last) if (last - position).abs() < DEDUP_EPSILON => {
                    // Collapsed into the existing point
                    if dynamic {
                        dynamic_index = Some(positions.len() - 1);
                    }
                }
                _ => {
                    if dynamic {
                        dynamic_index = Some(positions.len());
                    }
                    positions.push(position);
                }
            }
        }

        Self {
            positions,
            container_height,
            dynamic_index,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn container_height(&self) -> f32 {
        self.container_height
    }

    /// Where the sheet rests when closed
    pub fn closed_position(&self) -> f32 {
        self.container_height
    }

    /// Table index of the content-derived point, if present
    pub fn dynamic_index(&self) -> Option<usize> {
        self.dynamic_index
    }

    /// Highest valid index, or the closed sentinel for an empty table
    pub fn highest_index(&self) -> i32 {
        self.positions.len() as i32 - 1
    }

    /// Position for `index`; -1 yields the closed position
    pub fn position(&self, index: i32) -> Option<f32> {
        if index == CLOSED_INDEX {
            return Some(self.closed_position());
        }
        usize::try_from(index)
            .ok()
            .and_then(|i| self.positions.get(i).copied())
    }

    /// Clamp into `[-1, highest_index]`
    pub fn clamp_index(&self, index: i32) -> i32 {
        index.clamp(CLOSED_INDEX, self.highest_index())
    }

    /// Smallest allowed position (tallest sheet)
    pub fn top_position(&self) -> f32 {
        self.positions
            .last()
            .copied()
            .unwrap_or(self.container_height)
    }

    /// Largest snap position (smallest open sheet)
    pub fn bottom_position(&self) -> f32 {
        self.positions
            .first()
            .copied()
            .unwrap_or(self.container_height)
    }

    /// Fractional index for a position, clamped to `[-1, highest_index]`
    pub fn index_for_position(&self, position: f32) -> f32 {
        // interpolate() wants ascending input: tallest point first, closed last
        let mut input: SmallVec<[f32; 6]> = self.positions.iter().rev().copied().collect();
        input.push(self.closed_position());
        let mut output: SmallVec<[f32; 6]> = (0..self.positions.len())
            .rev()
            .map(|i| i as f32)
            .collect();
        output.push(CLOSED_INDEX as f32);

        interpolate(position, &input, &output, Extrapolate::Clamp)
    }

    /// Table index whose position is closest to `position`
    pub fn nearest_index(&self, position: f32) -> i32 {
        self.positions
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (*a - position).abs().total_cmp(&(*b - position).abs()))
            .map(|(i, _)| i as i32)
            .unwrap_or(CLOSED_INDEX)
    }

    /// Strictly descending positions
    pub fn is_monotonic(&self) -> bool {
        self.positions.windows(2).all(|pair| pair[0] > pair[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SnapPoint;

    fn three_point_config() -> SheetConfig {
        SheetConfig::new([
            SnapPoint::Percent(25.0),
            SnapPoint::Percent(50.0),
            SnapPoint::Percent(90.0),
        ])
    }

    #[test]
    fn test_percent_points_resolve_to_descending_positions() {
        let table = SnapTable::compute(&three_point_config(), &ContainerLayout::new(800.0), 0.0);

        assert_eq!(table.positions(), &[600.0, 400.0, 80.0]);
        assert_eq!(table.closed_position(), 800.0);
        assert_eq!(table.position(-1), Some(800.0));
        assert_eq!(table.position(3), None);
        assert!(table.is_monotonic());
    }

    #[test]
    fn test_index_for_position_is_piecewise_linear() {
        let table = SnapTable::compute(&three_point_config(), &ContainerLayout::new(800.0), 0.0);

        assert_eq!(table.index_for_position(800.0), -1.0);
        assert_eq!(table.index_for_position(900.0), -1.0);
        assert!((table.index_for_position(700.0) + 0.5).abs() < 1e-5);
        assert_eq!(table.index_for_position(600.0), 0.0);
        assert!((table.index_for_position(500.0) - 0.5).abs() < 1e-5);
        assert_eq!(table.index_for_position(80.0), 2.0);
        assert_eq!(table.index_for_position(-40.0), 2.0);
    }

    #[test]
    fn test_dynamic_point_inserted_in_order() {
        let config = three_point_config().dynamic_sizing(true);
        let table = SnapTable::compute(&config, &ContainerLayout::new(800.0), 350.0);

        assert_eq!(table.positions(), &[600.0, 450.0, 400.0, 80.0]);
        assert_eq!(table.dynamic_index(), Some(1));
        assert!(table.is_monotonic());
    }

    #[test]
    fn test_dynamic_point_respects_cap_and_dedup() {
        let config = three_point_config()
            .dynamic_sizing(true)
            .max_dynamic_content_size(400.0);
        let table = SnapTable::compute(&config, &ContainerLayout::new(800.0), 1200.0);

        // Capped at 400 tall, which coincides with the 50% point
        assert_eq!(table.positions(), &[600.0, 400.0, 80.0]);
        assert_eq!(table.dynamic_index(), Some(1));
    }

    #[test]
    fn test_unmeasured_content_leaves_dynamic_point_out() {
        let config = SheetConfig::new([]).dynamic_sizing(true);
        let table = SnapTable::compute(&config, &ContainerLayout::new(800.0), 0.0);
        assert!(table.is_empty());
        assert_eq!(table.index_for_position(300.0), -1.0);
        assert_eq!(table.highest_index(), -1);
    }

    #[test]
    fn test_unmeasured_container_yields_empty_table() {
        let table = SnapTable::compute(&three_point_config(), &ContainerLayout::new(0.0), 0.0);
        assert!(table.is_empty());
        assert_eq!(table.top_position(), 0.0);
    }

    #[test]
    fn test_mixed_units_sorted_when_container_shrinks() {
        // 500 fixed is taller than 50% of a 600 container
        let config = SheetConfig::new([SnapPoint::Fixed(500.0), SnapPoint::Percent(50.0)]);
        let table = SnapTable::compute(&config, &ContainerLayout::new(600.0), 0.0);
        assert_eq!(table.positions(), &[300.0, 100.0]);
        assert!(table.is_monotonic());
    }

    #[test]
    fn test_monotonic_after_any_content_height() {
        let config = three_point_config().dynamic_sizing(true);
        let layout = ContainerLayout::new(800.0);
        for step in 0..200 {
            let content = step as f32 * 5.0;
            let table = SnapTable::compute(&config, &layout, content);
            assert!(table.is_monotonic(), "not monotonic at content {content}");
        }
    }

    #[test]
    fn test_nearest_and_clamp() {
        let table = SnapTable::from_positions(800.0, [80.0, 600.0, 400.0]);
        assert_eq!(table.positions(), &[600.0, 400.0, 80.0]);
        assert_eq!(table.nearest_index(320.0), 1);
        assert_eq!(table.clamp_index(7), 2);
        assert_eq!(table.clamp_index(-4), -1);
    }
}
