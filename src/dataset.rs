//! Named-series collection and ingestion façade.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::attr::{AttributeId, AttributeValue, PlotGroup};
use crate::error::Error;
use crate::series::Point;
use crate::storage::TimestampRegistry;
use crate::strings::StringSeries;
use crate::timeseries::Timeseries;

/// One session's worth of named series.
///
/// Producers hold exactly one named series per logical signal and feed
/// it through [`DataSet::push_sample`] / [`DataSet::push_string_sample`];
/// consumers look series up by name and use the read accessors.
///
/// The dataset owns the timestamp deduplication registry: series
/// sampled on a common clock end up sharing sealed timestamp chunks,
/// and the registry's lifetime is exactly the dataset's: cleared
/// together, never global.
///
/// Not internally synchronized; callers serialize access externally.
#[derive(Debug, Default)]
pub struct DataSet {
    numeric: BTreeMap<String, Timeseries<f64>>,
    strings: BTreeMap<String, StringSeries>,
    groups: HashMap<String, Arc<PlotGroup>>,
    registry: TimestampRegistry,
}

impl DataSet {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a numeric series.
    pub fn numeric(&mut self, name: impl Into<String>) -> &mut Timeseries<f64> {
        self.numeric.entry(name.into()).or_default()
    }

    /// Get or create a string series.
    pub fn string(&mut self, name: impl Into<String>) -> &mut StringSeries {
        self.strings.entry(name.into()).or_default()
    }

    /// Look up a numeric series.
    pub fn get_numeric(&self, name: &str) -> Option<&Timeseries<f64>> {
        self.numeric.get(name)
    }

    /// Look up a numeric series mutably.
    pub fn get_numeric_mut(&mut self, name: &str) -> Option<&mut Timeseries<f64>> {
        self.numeric.get_mut(name)
    }

    /// Look up a string series.
    pub fn get_string(&self, name: &str) -> Option<&StringSeries> {
        self.strings.get(name)
    }

    /// Append a numeric sample to a named series.
    ///
    /// This is the ingestion entry point: when the append seals a
    /// timestamp chunk, the chunk is offered to the dedup registry and
    /// swapped for an already-registered identical one. Returns whether
    /// the sample was stored (non-finite samples are dropped).
    pub fn push_sample(&mut self, name: impl Into<String>, x: f64, y: f64) -> bool {
        let series = self.numeric.entry(name.into()).or_default();
        let result = series.push_back(Point::new(x, y));
        if result.sealed_chunk() {
            let sealed = series
                .data()
                .timestamps()
                .last_sealed_chunk()
                .map(|(index, chunk)| (index, Arc::clone(chunk)));
            if let Some((index, chunk)) = sealed
                && let Some(shared) = self.registry.intern(&chunk)
            {
                series
                    .data_mut()
                    .timestamps_mut()
                    .replace_chunk(index, shared);
            }
        }
        result.stored()
    }

    /// Append a string sample to a named series.
    ///
    /// Empty strings are dropped. Returns whether the sample was stored.
    pub fn push_string_sample(&mut self, name: impl Into<String>, x: f64, value: &str) -> bool {
        self.strings
            .entry(name.into())
            .or_default()
            .push_back(x, value)
    }

    /// Remove a named series (numeric or string).
    pub fn remove(&mut self, name: &str) -> bool {
        self.numeric.remove(name).is_some() | self.strings.remove(name).is_some()
    }

    /// Drop every series, group, and registry entry.
    pub fn clear(&mut self) {
        self.numeric.clear();
        self.strings.clear();
        self.groups.clear();
        self.registry.clear();
    }

    /// Number of series (numeric and string).
    pub fn len(&self) -> usize {
        self.numeric.len() + self.strings.len()
    }

    /// Check whether the dataset holds no series.
    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.strings.is_empty()
    }

    /// Names of all numeric series, in order.
    pub fn numeric_names(&self) -> impl Iterator<Item = &str> {
        self.numeric.keys().map(String::as_str)
    }

    /// Names of all string series, in order.
    pub fn string_names(&self) -> impl Iterator<Item = &str> {
        self.strings.keys().map(String::as_str)
    }

    /// Get or create a group.
    pub fn group(&mut self, name: impl Into<String>) -> Arc<PlotGroup> {
        let name = name.into();
        Arc::clone(
            self.groups
                .entry(name.clone())
                .or_insert_with(|| Arc::new(PlotGroup::new(name))),
        )
    }

    /// Attach a series (numeric or string) to a group.
    pub fn assign_group(&mut self, series: &str, group: impl Into<String>) -> Result<(), Error> {
        let handle = self.group(group);
        if let Some(numeric) = self.numeric.get_mut(series) {
            numeric.data_mut().set_group(Some(handle));
            return Ok(());
        }
        if let Some(strings) = self.strings.get_mut(series) {
            strings.set_group(Some(handle));
            return Ok(());
        }
        Err(Error::MissingSeries(series.to_owned()))
    }

    /// Update a group attribute.
    ///
    /// Group handles are immutable; the updated group replaces the old
    /// handle in the group table and in every series referencing it, so
    /// sibling series always observe the same metadata.
    pub fn set_group_attribute(
        &mut self,
        group: &str,
        id: AttributeId,
        value: AttributeValue,
    ) -> Result<(), Error> {
        let current = self.group(group);
        let mut updated = (*current).clone();
        updated.attributes_mut().set(id, value)?;
        let handle = Arc::new(updated);
        self.groups.insert(group.to_owned(), Arc::clone(&handle));
        for series in self.numeric.values_mut() {
            if series
                .data()
                .group()
                .is_some_and(|current| current.name() == group)
            {
                series.data_mut().set_group(Some(Arc::clone(&handle)));
            }
        }
        for series in self.strings.values_mut() {
            if series
                .group()
                .is_some_and(|current| current.name() == group)
            {
                series.set_group(Some(Arc::clone(&handle)));
            }
        }
        Ok(())
    }

    /// Build a derived XY series from two named sources.
    ///
    /// For every sample of `x_src`, the destination gets the point
    /// `(x_src value, y_src value at the same timestamp)`, re-sorted by
    /// the new X axis. Missing sources fail at construction.
    pub fn build_xy(&mut self, dst: impl Into<String>, x_src: &str, y_src: &str) -> Result<(), Error> {
        let x_series = self
            .numeric
            .get(x_src)
            .ok_or_else(|| Error::MissingSeries(x_src.to_owned()))?;
        let y_series = self
            .numeric
            .get(y_src)
            .ok_or_else(|| Error::MissingSeries(y_src.to_owned()))?;

        let mut derived = Timeseries::new();
        for point in x_series.iter() {
            if let Some(y) = y_series.y_from_x(point.x) {
                derived.push_unsorted(Point::new(point.y, y));
            }
        }
        derived.sort();
        self.numeric.insert(dst.into(), derived);
        Ok(())
    }

    /// The session's timestamp dedup registry.
    pub fn registry(&self) -> &TimestampRegistry {
        &self.registry
    }
}
