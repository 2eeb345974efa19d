//! Point-indexed series over parallel timestamp and value streams.

use std::sync::Arc;

use crate::attr::{AttributeId, AttributeMap, AttributeValue, PlotGroup};
use crate::error::Error;
use crate::range::Range;
use crate::storage::{ChunkedArray, Element};

/// A sample materialized from the parallel streams.
///
/// Points are built on demand; the engine never stores them densely as
/// structs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<V> {
    /// Timestamp (or generic X value) of the sample.
    pub x: f64,
    /// Sample value.
    pub y: V,
}

impl<V> Point<V> {
    /// Create a new point.
    pub fn new(x: f64, y: V) -> Self {
        Self { x, y }
    }
}

/// Outcome of an append attempt.
///
/// Sealing matters to ingestion: a just-sealed timestamp chunk is the
/// dedup registry's interning opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushResult {
    /// The sample failed validation and was dropped.
    Dropped,
    /// The sample was stored.
    Stored,
    /// The sample was stored and the append sealed the previously open
    /// timestamp chunk.
    SealedChunk,
}

impl PushResult {
    /// Whether the sample was stored.
    pub fn stored(self) -> bool {
        !matches!(self, Self::Dropped)
    }

    /// Whether the append sealed a timestamp chunk.
    pub fn sealed_chunk(self) -> bool {
        matches!(self, Self::SealedChunk)
    }
}

/// One named series: a timestamp stream and a value stream of equal
/// logical length, plus cached axis ranges and display metadata.
///
/// The cached X/Y ranges update in O(1) on append and only go dirty
/// when a tracked extreme is removed; the next range query recomputes
/// lazily. Cloning shares every chunk; mutation after a clone copies
/// only the touched chunk.
///
/// No method locks or blocks; callers serialize access externally.
#[derive(Debug, Clone)]
pub struct PlotSeries<V: Element> {
    timestamps: ChunkedArray<f64>,
    values: ChunkedArray<V>,
    x_range: Range,
    y_range: Range,
    x_dirty: bool,
    y_dirty: bool,
    attributes: AttributeMap,
    group: Option<Arc<PlotGroup>>,
}

impl<V: Element> PlotSeries<V> {
    /// Create an empty series.
    pub fn new() -> Self {
        Self {
            timestamps: ChunkedArray::new(),
            values: ChunkedArray::new(),
            x_range: Range::EMPTY,
            y_range: Range::EMPTY,
            x_dirty: false,
            y_dirty: false,
            attributes: AttributeMap::new(),
            group: None,
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.timestamps.len(), self.values.len());
        self.timestamps.len()
    }

    /// Check whether the series holds no points.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Drop all points and reset the cached ranges.
    pub fn clear(&mut self) {
        self.timestamps.clear();
        self.values.clear();
        self.x_range = Range::EMPTY;
        self.y_range = Range::EMPTY;
        self.x_dirty = false;
        self.y_dirty = false;
    }

    /// Materialize the point at an index.
    pub fn at(&self, index: usize) -> Option<Point<V>> {
        let x = self.timestamps.get(index)?;
        let y = self.values.get(index)?;
        Some(Point { x, y })
    }

    /// Timestamp at an index.
    pub fn x_at(&self, index: usize) -> Option<f64> {
        self.timestamps.get(index)
    }

    /// Iterate over all points, front to back.
    pub fn iter(&self) -> impl Iterator<Item = Point<V>> + '_ {
        self.timestamps
            .iter()
            .zip(self.values.iter())
            .map(|(x, y)| Point { x, y })
    }

    /// Append a point.
    ///
    /// Samples with a non-finite timestamp or numeric value are
    /// silently dropped (observable policy: malformed feeds must not
    /// poison a series). The result reports whether the append sealed a
    /// timestamp chunk, for ingestion paths that feed the dedup
    /// registry.
    ///
    /// Appends update the cached ranges with O(1) comparisons; a point
    /// interior to the current extremes never dirties them.
    pub fn push_back(&mut self, point: Point<V>) -> PushResult {
        if !self.validate(&point) {
            return PushResult::Dropped;
        }
        let sealed = self.timestamps.push_back(point.x);
        self.expand_ranges(point.x, point.y.scalar());
        self.values.push_back(point.y);
        if sealed {
            PushResult::SealedChunk
        } else {
            PushResult::Stored
        }
    }

    /// Insert a point at an arbitrary index.
    ///
    /// Same validation as [`PlotSeries::push_back`]; delegates to the
    /// containers' O(n) interior insert.
    pub fn insert(&mut self, index: usize, point: Point<V>) -> bool {
        if !self.validate(&point) {
            return false;
        }
        self.timestamps.insert(index, point.x);
        self.expand_ranges(point.x, point.y.scalar());
        self.values.insert(index, point.y);
        true
    }

    /// Remove the oldest point.
    ///
    /// A cached range goes dirty only when the removed sample was its
    /// tracked extreme.
    pub fn pop_front(&mut self) -> Option<Point<V>> {
        let x = self.timestamps.pop_front()?;
        let y = self.values.pop_front()?;
        if x <= self.x_range.min || x >= self.x_range.max {
            self.x_dirty = true;
        }
        if let Some(scalar) = y.scalar()
            && (scalar <= self.y_range.min || scalar >= self.y_range.max)
        {
            self.y_dirty = true;
        }
        Some(Point { x, y })
    }

    /// Overwrite the value at an index, returning the old value.
    ///
    /// This is the explicit write-back path for in-place edits; writing
    /// into a compressed chunk decompresses it. Invalid (non-finite
    /// numeric) values are dropped and leave the series untouched.
    pub fn set_value(&mut self, index: usize, value: V) -> Option<V> {
        if !value.is_valid_sample() {
            log::debug!("dropping non-finite value write at index {index}");
            return None;
        }
        let new_scalar = value.scalar();
        let old = self.values.set(index, value)?;
        match old.scalar() {
            Some(scalar) if scalar <= self.y_range.min || scalar >= self.y_range.max => {
                self.y_dirty = true;
            }
            _ => {
                if let Some(scalar) = new_scalar {
                    self.y_range.expand_to_include(scalar);
                }
            }
        }
        Some(old)
    }

    /// Bounding interval of the timestamp stream.
    ///
    /// `None` when the series is empty. A dirty bound recomputes by
    /// scanning the timestamps.
    pub fn range_x(&mut self) -> Option<Range> {
        if self.is_empty() {
            return None;
        }
        if self.x_dirty {
            let mut range = Range::EMPTY;
            for x in self.timestamps.iter() {
                range.expand_to_include(x);
            }
            self.x_range = range;
            self.x_dirty = false;
        }
        Some(self.x_range)
    }

    /// Bounding interval of the value stream.
    ///
    /// `None` when the series is empty or the value kind is
    /// non-numeric. A dirty bound recomputes from per-chunk aggregates,
    /// which survive compression, so no element storage is touched.
    pub fn range_y(&mut self) -> Option<Range> {
        if self.is_empty() {
            return None;
        }
        if self.y_dirty {
            self.y_range = self.values.aggregate_range();
            self.y_dirty = false;
        }
        if self.y_range.is_empty() {
            return None;
        }
        Some(self.y_range)
    }

    /// Set a display attribute, rejecting values of the wrong kind.
    pub fn set_attribute(&mut self, id: AttributeId, value: AttributeValue) -> Result<(), Error> {
        self.attributes.set(id, value)
    }

    /// Read a display attribute.
    pub fn attribute(&self, id: AttributeId) -> Option<&AttributeValue> {
        self.attributes.get(id)
    }

    /// Attach the series to a group.
    pub fn set_group(&mut self, group: Option<Arc<PlotGroup>>) {
        self.group = group;
    }

    /// The group this series belongs to.
    pub fn group(&self) -> Option<&Arc<PlotGroup>> {
        self.group.as_ref()
    }

    /// Snapshot the current points into a new series.
    ///
    /// Chunks are shared, not copied; either side mutating a shared
    /// chunk clones it first, so the other side is unaffected.
    pub fn clone_points(&self) -> Self {
        self.clone()
    }

    /// Check whether any timestamp chunk is physically shared with
    /// another series.
    pub fn shares_timestamps_with(&self, other: &Self) -> bool {
        (0..self.timestamps.chunk_count()).any(|i| {
            let Some(mine) = self.timestamps.chunk_handle(i) else {
                return false;
            };
            (0..other.timestamps.chunk_count()).any(|j| {
                other
                    .timestamps
                    .chunk_handle(j)
                    .is_some_and(|theirs| Arc::ptr_eq(mine, theirs))
            })
        })
    }

    /// The timestamp stream.
    pub fn timestamps(&self) -> &ChunkedArray<f64> {
        &self.timestamps
    }

    /// The value stream.
    pub fn values(&self) -> &ChunkedArray<V> {
        &self.values
    }

    pub(crate) fn timestamps_mut(&mut self) -> &mut ChunkedArray<f64> {
        &mut self.timestamps
    }

    fn validate(&self, point: &Point<V>) -> bool {
        if !point.x.is_finite() {
            log::debug!("dropping sample with non-finite timestamp");
            return false;
        }
        if !point.y.is_valid_sample() {
            log::debug!("dropping sample with non-finite value at x={}", point.x);
            return false;
        }
        true
    }

    fn expand_ranges(&mut self, x: f64, y_scalar: Option<f64>) {
        self.x_range.expand_to_include(x);
        if let Some(scalar) = y_scalar {
            self.y_range.expand_to_include(scalar);
        }
    }
}

impl<V: Element> Default for PlotSeries<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_with_y(values: &[f64]) -> PlotSeries<f64> {
        let mut series = PlotSeries::new();
        for (i, y) in values.iter().enumerate() {
            assert!(series.push_back(Point::new(i as f64, *y)).stored());
        }
        series
    }

    #[test]
    fn streams_stay_equal_length() {
        let mut series = series_with_y(&[1.0, 2.0, 3.0]);
        series.pop_front();
        series.insert(1, Point::new(0.5, 9.0));
        assert_eq!(series.timestamps().len(), series.values().len());
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn non_finite_samples_are_dropped() {
        let mut series = PlotSeries::new();
        assert_eq!(series.push_back(Point::new(f64::NAN, 1.0)), PushResult::Dropped);
        assert_eq!(series.push_back(Point::new(0.0, f64::INFINITY)), PushResult::Dropped);
        assert!(series.is_empty());
    }

    #[test]
    fn push_reports_chunk_seal() {
        use crate::storage::CHUNK_CAPACITY;

        let mut series = PlotSeries::new();
        for i in 0..CHUNK_CAPACITY {
            let result = series.push_back(Point::new(i as f64, 0.0));
            assert_eq!(result, PushResult::Stored);
        }
        // Filling the chunk does not seal it; the next append does.
        let result = series.push_back(Point::new(CHUNK_CAPACITY as f64, 0.0));
        assert_eq!(result, PushResult::SealedChunk);
    }

    #[test]
    fn push_keeps_ranges_clean() {
        let mut series = series_with_y(&[5.0, 3.0, 8.0, 1.0, 9.0]);
        assert_eq!(series.range_y(), Some(Range::new(1.0, 9.0)));
        assert_eq!(series.range_x(), Some(Range::new(0.0, 4.0)));
    }

    #[test]
    fn popping_an_extreme_forces_recompute() {
        let mut series = PlotSeries::new();
        for (x, y) in [(0.0, 1.0), (1.0, 3.0), (2.0, 9.0)] {
            series.push_back(Point::new(x, y));
        }
        series.pop_front();
        assert_eq!(series.range_y(), Some(Range::new(3.0, 9.0)));
        assert_eq!(series.range_x(), Some(Range::new(1.0, 2.0)));
    }

    #[test]
    fn popping_interior_value_keeps_cached_range() {
        let mut series = PlotSeries::new();
        for (x, y) in [(0.0, 5.0), (1.0, 1.0), (2.0, 9.0)] {
            series.push_back(Point::new(x, y));
        }
        // 5.0 is neither the min nor the max of [1, 9].
        series.pop_front();
        assert_eq!(series.range_y(), Some(Range::new(1.0, 9.0)));
    }

    #[test]
    fn set_value_updates_range() {
        let mut series = series_with_y(&[2.0, 4.0, 6.0]);
        assert_eq!(series.set_value(1, 10.0), Some(4.0));
        assert_eq!(series.range_y(), Some(Range::new(2.0, 10.0)));
        assert_eq!(series.set_value(2, 3.0), Some(6.0));
        assert_eq!(series.range_y(), Some(Range::new(2.0, 10.0)));
    }

    #[test]
    fn set_value_rejects_non_finite() {
        let mut series = series_with_y(&[2.0]);
        assert_eq!(series.set_value(0, f64::NAN), None);
        assert_eq!(series.at(0), Some(Point::new(0.0, 2.0)));
    }

    #[test]
    fn cloned_series_is_isolated() {
        let series = series_with_y(&[1.0, 2.0, 3.0]);
        let mut copy = series.clone_points();
        assert!(copy.shares_timestamps_with(&series));

        copy.set_value(0, 100.0);
        copy.pop_front();
        assert_eq!(series.at(0), Some(Point::new(0.0, 1.0)));
        assert_eq!(series.len(), 3);
    }
}
