//! Footer margin adjustment
//!
//! Content that opts in reserves room at its bottom for the footer, so the
//! last rows are not hidden behind it.

use crate::content::{ContentRegion, ContentSnapshot, InstanceKey};

/// Bottom margin for content given the measured footer height
pub fn footer_margin(base_margin: f32, footer_height: f32, enabled: bool) -> f32 {
    if !enabled {
        return base_margin;
    }
    base_margin + footer_height.max(0.0)
}

/// [`footer_margin`] reading the footer height of `key` from a snapshot
pub fn footer_margin_for(
    snapshot: &ContentSnapshot,
    key: &InstanceKey,
    base_margin: f32,
    enabled: bool,
) -> f32 {
    footer_margin(
        base_margin,
        snapshot.region_height(key, ContentRegion::Footer),
        enabled,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentHeightAggregator;

    #[test]
    fn test_margin_adds_footer_only_when_enabled() {
        assert_eq!(footer_margin(8.0, 56.0, true), 64.0);
        assert_eq!(footer_margin(8.0, 56.0, false), 8.0);
        assert_eq!(footer_margin(8.0, -3.0, true), 8.0);
    }

    #[test]
    fn test_margin_tracks_reported_footer() {
        let aggregator = ContentHeightAggregator::new(10.0);
        let key = InstanceKey::new("a");
        assert_eq!(footer_margin_for(&aggregator.snapshot(), &key, 0.0, true), 0.0);

        aggregator.report_region_height(&key, ContentRegion::Footer, 72.0);
        assert_eq!(footer_margin_for(&aggregator.snapshot(), &key, 0.0, true), 72.0);
    }
}
