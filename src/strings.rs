//! String-valued series with flyweight interning.

use std::collections::HashSet;
use std::sync::Arc;

use crate::attr::{AttributeId, AttributeValue, PlotGroup};
use crate::error::Error;
use crate::range::Range;
use crate::series::Point;
use crate::storage::Element;
use crate::timeseries::Timeseries;

/// Longest string stored inline, bypassing the intern store.
const INLINE_CAPACITY: usize = 15;

/// A stored string sample: either a small inline string or a shared
/// reference to one canonical copy owned by the series' intern store.
///
/// N samples of the same long string cost one copy of the bytes plus N
/// cheap references.
#[derive(Debug, Clone)]
pub struct StringRef(Repr);

#[derive(Debug, Clone)]
enum Repr {
    Inline { len: u8, bytes: [u8; INLINE_CAPACITY] },
    Shared(Arc<str>),
}

impl StringRef {
    fn inline(value: &str) -> Self {
        debug_assert!(value.len() <= INLINE_CAPACITY);
        let mut bytes = [0u8; INLINE_CAPACITY];
        bytes[..value.len()].copy_from_slice(value.as_bytes());
        Self(Repr::Inline {
            len: value.len() as u8,
            bytes,
        })
    }

    fn shared(value: Arc<str>) -> Self {
        Self(Repr::Shared(value))
    }

    /// The string contents.
    pub fn as_str(&self) -> &str {
        match &self.0 {
            Repr::Inline { len, bytes } => {
                std::str::from_utf8(&bytes[..*len as usize]).unwrap_or("")
            }
            Repr::Shared(value) => value,
        }
    }

    /// Check whether this reference uses the inline fast path.
    pub fn is_inline(&self) -> bool {
        matches!(self.0, Repr::Inline { .. })
    }
}

impl PartialEq for StringRef {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for StringRef {}

impl Element for StringRef {
    fn scalar(&self) -> Option<f64> {
        None
    }

    fn from_scalar(_scalar: f64) -> Option<Self> {
        None
    }
}

/// A time-ordered series of string samples.
///
/// Short strings stay inline; longer ones are deduplicated by content
/// against the series' private intern store before a reference is
/// stored. Empty strings are dropped: empty means "no sample", not
/// "sample of the empty string".
#[derive(Debug, Clone, Default)]
pub struct StringSeries {
    series: Timeseries<StringRef>,
    store: HashSet<Arc<str>>,
}

impl StringSeries {
    /// Create an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a string sample, interning long values.
    ///
    /// Returns whether the sample was stored.
    pub fn push_back(&mut self, x: f64, value: &str) -> bool {
        if value.is_empty() {
            log::debug!("dropping empty string sample at x={x}");
            return false;
        }
        if !x.is_finite() {
            // Reject before interning so dropped samples leave no store entry.
            log::debug!("dropping string sample with non-finite timestamp");
            return false;
        }
        let value = self.make_ref(value);
        self.series.push_back(Point::new(x, value)).stored()
    }

    /// Merge all samples of another series into this one.
    ///
    /// Every non-inline value is re-interned against this series' own
    /// store, preserving the single-owner-per-series invariant, then
    /// merged in time order.
    pub fn merge_with(&mut self, other: &StringSeries) {
        for point in other.iter() {
            let value = self.make_ref(point.y.as_str());
            self.series.push_back(Point::new(point.x, value));
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Check whether the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Drop all samples and the intern store.
    pub fn clear(&mut self) {
        self.series.clear();
        self.store.clear();
    }

    /// Materialize the sample at an index.
    pub fn at(&self, index: usize) -> Option<Point<StringRef>> {
        self.series.at(index)
    }

    /// Iterate over all samples in time order.
    pub fn iter(&self) -> impl Iterator<Item = Point<StringRef>> + '_ {
        self.series.iter()
    }

    /// Remove the oldest sample.
    pub fn pop_front(&mut self) -> Option<Point<StringRef>> {
        self.series.pop_front()
    }

    /// Bounding interval of the timestamps.
    pub fn range_x(&mut self) -> Option<Range> {
        self.series.range_x()
    }

    /// Bound the covered time span (sliding window).
    pub fn set_maximum_range_x(&mut self, span: f64) {
        self.series.set_maximum_range_x(span);
    }

    /// Value of the sample nearest to a timestamp.
    pub fn y_from_x(&self, x: f64) -> Option<StringRef> {
        self.series.y_from_x(x)
    }

    /// Set a display attribute, rejecting values of the wrong kind.
    pub fn set_attribute(&mut self, id: AttributeId, value: AttributeValue) -> Result<(), Error> {
        self.series.data_mut().set_attribute(id, value)
    }

    /// Read a display attribute.
    pub fn attribute(&self, id: AttributeId) -> Option<&AttributeValue> {
        self.series.data().attribute(id)
    }

    /// Attach the series to a group.
    pub fn set_group(&mut self, group: Option<Arc<PlotGroup>>) {
        self.series.data_mut().set_group(group);
    }

    /// The group this series belongs to.
    pub fn group(&self) -> Option<&Arc<PlotGroup>> {
        self.series.data().group()
    }

    /// The underlying time-ordered series.
    pub fn data(&self) -> &Timeseries<StringRef> {
        &self.series
    }

    /// Mutable access to the underlying time-ordered series.
    pub fn data_mut(&mut self) -> &mut Timeseries<StringRef> {
        &mut self.series
    }

    /// Number of distinct interned (non-inline) strings.
    pub fn interned_count(&self) -> usize {
        self.store.len()
    }

    fn make_ref(&mut self, value: &str) -> StringRef {
        if value.len() <= INLINE_CAPACITY {
            return StringRef::inline(value);
        }
        if let Some(existing) = self.store.get(value) {
            return StringRef::shared(Arc::clone(existing));
        }
        let canonical: Arc<str> = Arc::from(value);
        self.store.insert(Arc::clone(&canonical));
        StringRef::shared(canonical)
    }
}
