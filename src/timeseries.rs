//! Time-ordered series with order repair and sliding-window eviction.

use crate::range::Range;
use crate::series::{PlotSeries, Point, PushResult};
use crate::storage::Element;

/// A series whose timestamps are kept non-decreasing at all times.
///
/// Out-of-order arrivals are repaired on insertion: a sample older than
/// the current tail is placed at its sorted position instead of
/// appended. That repair takes the O(n) interior-insert path, so bulk
/// loaders with unsorted input should prefer
/// [`Timeseries::push_unsorted`] followed by one [`Timeseries::sort`].
/// Both primitives are exposed; the producer chooses.
///
/// An optional maximum X span turns the series into a sliding window:
/// after every insertion the front is evicted while the covered span
/// exceeds the limit and more than two points remain.
#[derive(Debug, Clone)]
pub struct Timeseries<V: Element> {
    series: PlotSeries<V>,
    max_range_x: f64,
}

impl<V: Element> Timeseries<V> {
    /// Create an empty series with an unbounded window.
    pub fn new() -> Self {
        Self {
            series: PlotSeries::new(),
            max_range_x: f64::MAX,
        }
    }

    /// Append a sample, repairing time order when it arrives late.
    ///
    /// Non-finite samples are dropped, as in [`PlotSeries::push_back`].
    /// Only the in-order append path reports a sealed chunk; the
    /// order-repair path rebuilds the streams wholesale.
    pub fn push_back(&mut self, point: Point<V>) -> PushResult {
        if !point.x.is_finite() {
            log::debug!("dropping sample with non-finite timestamp");
            return PushResult::Dropped;
        }
        let out_of_order = self
            .series
            .x_at(self.series.len().wrapping_sub(1))
            .is_some_and(|last| point.x < last);
        let result = if out_of_order {
            // Equal timestamps keep arrival order: insert after the run.
            let position = self.series.timestamps().upper_bound(point.x);
            if self.series.insert(position, point) {
                PushResult::Stored
            } else {
                PushResult::Dropped
            }
        } else {
            self.series.push_back(point)
        };
        if result.stored() {
            self.trim_range();
        }
        result
    }

    /// Append without maintaining time order.
    ///
    /// Escape hatch for bulk loaders; the series is in an unordered
    /// state until [`Timeseries::sort`] runs. The non-finite drop
    /// policy still applies.
    pub fn push_unsorted(&mut self, point: Point<V>) -> PushResult {
        self.series.push_back(point)
    }

    /// Stable re-sort by timestamp, rebuilding both streams.
    ///
    /// O(n log n); intended to run once after a bulk unsorted load
    /// rather than per sample.
    pub fn sort(&mut self) {
        let points: Vec<Point<V>> = self.series.iter().collect();
        let mut order: Vec<usize> = (0..points.len()).collect();
        order.sort_by(|a, b| {
            points[*a]
                .x
                .partial_cmp(&points[*b].x)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        log::debug!("re-sorting {} points", points.len());

        self.series.clear();
        for index in order {
            let point = points[index].clone();
            self.series.push_back(point);
        }
        self.trim_range();
    }

    /// Bound the covered time span.
    ///
    /// Takes effect immediately and after every future insertion.
    pub fn set_maximum_range_x(&mut self, span: f64) {
        self.max_range_x = span;
        self.trim_range();
    }

    /// The configured maximum time span.
    pub fn maximum_range_x(&self) -> f64 {
        self.max_range_x
    }

    /// Index of the sample nearest to a timestamp.
    ///
    /// `None` for an empty series; clamps to the last index when `x`
    /// lies past the data, and breaks ties toward the closer neighbor.
    pub fn index_from_x(&self, x: f64) -> Option<usize> {
        if self.series.is_empty() || !x.is_finite() {
            return None;
        }
        let lower = self.series.timestamps().lower_bound(x);
        if lower == 0 {
            return Some(0);
        }
        if lower >= self.series.len() {
            return Some(self.series.len() - 1);
        }
        let left = lower - 1;
        let left_distance = (self.series.x_at(left)? - x).abs();
        let right_distance = (self.series.x_at(lower)? - x).abs();
        if left_distance <= right_distance {
            Some(left)
        } else {
            Some(lower)
        }
    }

    /// Value of the sample nearest to a timestamp.
    pub fn y_from_x(&self, x: f64) -> Option<V> {
        let index = self.index_from_x(x)?;
        Some(self.series.at(index)?.y)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Check whether the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Drop all samples.
    pub fn clear(&mut self) {
        self.series.clear();
    }

    /// Materialize the sample at an index.
    pub fn at(&self, index: usize) -> Option<Point<V>> {
        self.series.at(index)
    }

    /// Iterate over all samples in time order.
    pub fn iter(&self) -> impl Iterator<Item = Point<V>> + '_ {
        self.series.iter()
    }

    /// Remove the oldest sample.
    pub fn pop_front(&mut self) -> Option<Point<V>> {
        self.series.pop_front()
    }

    /// Bounding interval of the timestamps.
    pub fn range_x(&mut self) -> Option<Range> {
        self.series.range_x()
    }

    /// Bounding interval of the values.
    pub fn range_y(&mut self) -> Option<Range> {
        self.series.range_y()
    }

    /// The underlying series (ranges, attributes, grouping, cloning).
    pub fn data(&self) -> &PlotSeries<V> {
        &self.series
    }

    /// Mutable access to the underlying series.
    pub fn data_mut(&mut self) -> &mut PlotSeries<V> {
        &mut self.series
    }

    fn trim_range(&mut self) {
        if self.max_range_x == f64::MAX {
            return;
        }
        let mut evicted = 0usize;
        while self.series.len() > 2 {
            let Some((first, last)) = self.series.timestamps().front_back() else {
                break;
            };
            if last - first <= self.max_range_x {
                break;
            }
            self.series.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            log::trace!("sliding window evicted {evicted} samples");
        }
    }
}

impl<V: Element> Default for Timeseries<V> {
    fn default() -> Self {
        Self::new()
    }
}
