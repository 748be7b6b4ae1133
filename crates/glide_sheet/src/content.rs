//! Content-height aggregation
//!
//! Content regions (drag handle, scrollable body, footer) measure
//! themselves independently and report heights keyed by
//! `(instance key, region)`. The aggregator folds those reports into a
//! versioned, immutable [`ContentSnapshot`]; every accepted report publishes
//! a fresh snapshot and readers compare snapshots instead of watching a
//! mutable map.
//!
//! The combined content height of an instance is the plain sum of its
//! region entries. A region that has not reported yet counts as zero.
//!
//! Reports that move a region by less than the configured epsilon (relative
//! to the last accepted value for that region) are dropped, so sub-pixel
//! layout noise cannot make the snap table oscillate.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use glide_core::SnapshotCell;
use rustc_hash::FxHashMap;

use crate::error::SheetError;

/// Named content regions of a sheet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentRegion {
    Handle,
    Body,
    Footer,
}

impl ContentRegion {
    pub const ALL: [ContentRegion; 3] = [
        ContentRegion::Handle,
        ContentRegion::Body,
        ContentRegion::Footer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentRegion::Handle => "handle",
            ContentRegion::Body => "body",
            ContentRegion::Footer => "footer",
        }
    }
}

impl fmt::Display for ContentRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentRegion {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "handle" => Ok(ContentRegion::Handle),
            "body" => Ok(ContentRegion::Body),
            "footer" => Ok(ContentRegion::Footer),
            other => Err(SheetError::ConfigParse(format!(
                "unknown content region '{other}'"
            ))),
        }
    }
}

/// Identifies one sheet instance (route key)
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceKey(Arc<str>);

impl InstanceKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceKey({:?})", &*self.0)
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for InstanceKey {
    fn from(key: String) -> Self {
        Self(Arc::from(key))
    }
}

/// Latest height of one region
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionEntry {
    pub height: f32,
    /// Seeded from an estimate; replaced by the first real report
    pub estimated: bool,
}

/// One immutable generation of the height map
#[derive(Clone, Debug, Default)]
pub struct ContentSnapshot {
    version: u64,
    entries: FxHashMap<(InstanceKey, ContentRegion), RegionEntry>,
}

impl ContentSnapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn entry(&self, key: &InstanceKey, region: ContentRegion) -> Option<RegionEntry> {
        self.entries.get(&(key.clone(), region)).copied()
    }

    /// Height of a region; missing regions are zero
    pub fn region_height(&self, key: &InstanceKey, region: ContentRegion) -> f32 {
        self.entry(key, region).map_or(0.0, |entry| entry.height)
    }

    /// Combined content height of an instance
    pub fn aggregated_height(&self, key: &InstanceKey) -> f32 {
        ContentRegion::ALL
            .iter()
            .map(|&region| self.region_height(key, region))
            .sum()
    }

    pub fn contains_instance(&self, key: &InstanceKey) -> bool {
        self.entries.keys().any(|(entry_key, _)| entry_key == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of a height report
#[derive(Clone, Debug)]
pub enum HeightReport {
    /// A new snapshot was published
    Accepted {
        snapshot: Arc<ContentSnapshot>,
        previous_total: f32,
        total: f32,
    },
    /// Moved less than the epsilon from the last accepted value
    BelowEpsilon,
    /// Same value as the last accepted one
    Unchanged,
}

impl HeightReport {
    pub fn is_accepted(&self) -> bool {
        matches!(self, HeightReport::Accepted { .. })
    }
}

/// Versioned, instance-keyed content height map
#[derive(Debug)]
pub struct ContentHeightAggregator {
    cell: SnapshotCell<ContentSnapshot>,
    epsilon: f32,
    /// Serializes read-modify-publish so reports apply in arrival order
    write: Mutex<()>,
}

impl ContentHeightAggregator {
    pub fn new(epsilon: f32) -> Self {
        Self {
            cell: SnapshotCell::new(ContentSnapshot::default()),
            epsilon: if epsilon.is_finite() { epsilon.max(0.0) } else { 0.0 },
            write: Mutex::new(()),
        }
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn snapshot(&self) -> Arc<ContentSnapshot> {
        self.cell.load()
    }

    pub fn aggregated_height(&self, key: &InstanceKey) -> f32 {
        self.snapshot().aggregated_height(key)
    }

    /// Record a measured region height (last write wins)
    pub fn report_region_height(
        &self,
        key: &InstanceKey,
        region: ContentRegion,
        height: f32,
    ) -> HeightReport {
        let height = sanitize(key, region, height);
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.cell.load();

        if let Some(entry) = current.entry(key, region) {
            if !entry.estimated {
                let delta = (entry.height - height).abs();
                if delta == 0.0 {
                    return HeightReport::Unchanged;
                }
                if delta < self.epsilon {
                    tracing::trace!(
                        "ignoring {} height {} for '{}': within {} of {}",
                        region,
                        height,
                        key,
                        self.epsilon,
                        entry.height
                    );
                    return HeightReport::BelowEpsilon;
                }
            }
        }

        self.publish_entry(
            &current,
            key,
            region,
            RegionEntry {
                height,
                estimated: false,
            },
        )
    }

    /// Seed a region with an estimate before it is measured
    ///
    /// Ignored once the region has any entry.
    pub fn seed_region_height(
        &self,
        key: &InstanceKey,
        region: ContentRegion,
        height: f32,
    ) -> HeightReport {
        let height = sanitize(key, region, height);
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.cell.load();

        if current.entry(key, region).is_some() {
            return HeightReport::Unchanged;
        }
        self.publish_entry(
            &current,
            key,
            region,
            RegionEntry {
                height,
                estimated: true,
            },
        )
    }

    /// Drop the entry of an unmounted region
    pub fn evict_region(&self, key: &InstanceKey, region: ContentRegion) -> HeightReport {
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.cell.load();
        if current.entry(key, region).is_none() {
            return HeightReport::Unchanged;
        }

        let previous_total = current.aggregated_height(key);
        let mut next = (*current).clone();
        next.entries.remove(&(key.clone(), region));
        tracing::debug!("evicted {} height for '{}'", region, key);
        self.publish(next, key, previous_total)
    }

    /// Drop every entry of an instance (unmount or key change)
    pub fn retire_instance(&self, key: &InstanceKey) -> HeightReport {
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.cell.load();
        if !current.contains_instance(key) {
            return HeightReport::Unchanged;
        }

        let previous_total = current.aggregated_height(key);
        let mut next = (*current).clone();
        next.entries.retain(|(entry_key, _), _| entry_key != key);
        tracing::debug!("retired content heights for '{}'", key);
        self.publish(next, key, previous_total)
    }

    fn publish_entry(
        &self,
        current: &ContentSnapshot,
        key: &InstanceKey,
        region: ContentRegion,
        entry: RegionEntry,
    ) -> HeightReport {
        let previous_total = current.aggregated_height(key);
        let mut next = current.clone();
        next.entries.insert((key.clone(), region), entry);
        tracing::debug!(
            "{} height for '{}' = {}{}",
            region,
            key,
            entry.height,
            if entry.estimated { " (estimated)" } else { "" }
        );
        self.publish(next, key, previous_total)
    }

    fn publish(&self, mut next: ContentSnapshot, key: &InstanceKey, previous_total: f32) -> HeightReport {
        next.version = self.cell.version() + 1;
        let total = next.aggregated_height(key);
        let snapshot = Arc::new(next);
        self.cell.publish_arc(Arc::clone(&snapshot));
        HeightReport::Accepted {
            snapshot,
            previous_total,
            total,
        }
    }
}

impl Default for ContentHeightAggregator {
    fn default() -> Self {
        Self::new(10.0)
    }
}

fn sanitize(key: &InstanceKey, region: ContentRegion, height: f32) -> f32 {
    if height.is_finite() && height >= 0.0 {
        return height;
    }
    tracing::warn!(
        "invalid {} height {} reported for '{}'; treating as 0",
        region,
        height,
        key
    );
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted_total(report: &HeightReport) -> f32 {
        match report {
            HeightReport::Accepted { total, .. } => *total,
            other => panic!("expected an accepted report, got {other:?}"),
        }
    }

    #[test]
    fn test_regions_sum_per_instance() {
        let aggregator = ContentHeightAggregator::new(10.0);
        let key = InstanceKey::new("route-a");

        aggregator.report_region_height(&key, ContentRegion::Body, 300.0);
        let report = aggregator.report_region_height(&key, ContentRegion::Footer, 50.0);

        assert_eq!(accepted_total(&report), 350.0);
        assert_eq!(aggregator.aggregated_height(&key), 350.0);
        assert_eq!(
            aggregator
                .snapshot()
                .region_height(&key, ContentRegion::Handle),
            0.0
        );
    }

    #[test]
    fn test_epsilon_is_measured_from_last_accepted_value() {
        let aggregator = ContentHeightAggregator::new(10.0);
        let key = InstanceKey::new("route-a");
        aggregator.report_region_height(&key, ContentRegion::Body, 300.0);

        assert!(matches!(
            aggregator.report_region_height(&key, ContentRegion::Body, 305.0),
            HeightReport::BelowEpsilon
        ));
        assert!(matches!(
            aggregator.report_region_height(&key, ContentRegion::Body, 309.0),
            HeightReport::BelowEpsilon
        ));
        let report = aggregator.report_region_height(&key, ContentRegion::Body, 320.0);
        assert_eq!(accepted_total(&report), 320.0);
    }

    #[test]
    fn test_repeated_report_is_idempotent() {
        let aggregator = ContentHeightAggregator::new(0.0);
        let key = InstanceKey::new("route-a");

        assert!(aggregator
            .report_region_height(&key, ContentRegion::Body, 120.0)
            .is_accepted());
        let version = aggregator.snapshot().version();

        assert!(matches!(
            aggregator.report_region_height(&key, ContentRegion::Body, 120.0),
            HeightReport::Unchanged
        ));
        assert_eq!(aggregator.snapshot().version(), version);
    }

    #[test]
    fn test_estimate_is_replaced_by_first_real_report() {
        let aggregator = ContentHeightAggregator::new(10.0);
        let key = InstanceKey::new("list");

        aggregator.seed_region_height(&key, ContentRegion::Body, 400.0);
        let entry = aggregator
            .snapshot()
            .entry(&key, ContentRegion::Body)
            .unwrap();
        assert!(entry.estimated);

        // Within epsilon of the estimate, but real measurements always win
        let report = aggregator.report_region_height(&key, ContentRegion::Body, 404.0);
        assert_eq!(accepted_total(&report), 404.0);

        // Seeding again after a real report does nothing
        assert!(matches!(
            aggregator.seed_region_height(&key, ContentRegion::Body, 10.0),
            HeightReport::Unchanged
        ));
    }

    #[test]
    fn test_instances_do_not_cross_contaminate() {
        let aggregator = ContentHeightAggregator::new(10.0);
        let a = InstanceKey::new("a");
        let b = InstanceKey::new("b");

        aggregator.report_region_height(&a, ContentRegion::Body, 200.0);
        aggregator.report_region_height(&b, ContentRegion::Body, 500.0);

        assert_eq!(aggregator.aggregated_height(&a), 200.0);
        assert_eq!(aggregator.aggregated_height(&b), 500.0);

        let report = aggregator.retire_instance(&a);
        assert_eq!(accepted_total(&report), 0.0);
        assert_eq!(aggregator.aggregated_height(&b), 500.0);
        assert!(!aggregator.snapshot().contains_instance(&a));
    }

    #[test]
    fn test_evicted_region_stops_contributing() {
        let aggregator = ContentHeightAggregator::new(10.0);
        let key = InstanceKey::new("a");
        aggregator.report_region_height(&key, ContentRegion::Body, 300.0);
        aggregator.report_region_height(&key, ContentRegion::Footer, 60.0);

        let report = aggregator.evict_region(&key, ContentRegion::Footer);
        assert_eq!(accepted_total(&report), 300.0);
        assert!(matches!(
            aggregator.evict_region(&key, ContentRegion::Footer),
            HeightReport::Unchanged
        ));
    }

    #[test]
    fn test_invalid_heights_count_as_zero() {
        let aggregator = ContentHeightAggregator::new(10.0);
        let key = InstanceKey::new("a");
        aggregator.report_region_height(&key, ContentRegion::Body, 50.0);

        let report = aggregator.report_region_height(&key, ContentRegion::Body, f32::NAN);
        assert_eq!(accepted_total(&report), 0.0);
    }

    #[test]
    fn test_old_snapshots_are_immutable() {
        let aggregator = ContentHeightAggregator::new(10.0);
        let key = InstanceKey::new("a");
        aggregator.report_region_height(&key, ContentRegion::Body, 100.0);
        let before = aggregator.snapshot();

        aggregator.report_region_height(&key, ContentRegion::Body, 200.0);

        assert_eq!(before.aggregated_height(&key), 100.0);
        assert_eq!(aggregator.aggregated_height(&key), 200.0);
        assert!(aggregator.snapshot().version() > before.version());
    }

    #[test]
    fn test_region_names_parse() {
        assert_eq!("footer".parse::<ContentRegion>().unwrap(), ContentRegion::Footer);
        assert!("sidebar".parse::<ContentRegion>().is_err());
    }
}
