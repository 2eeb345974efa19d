//! Fixed-capacity storage segments.

use crate::range::Range;
use crate::storage::element::Element;

/// Number of elements a chunk can hold.
pub const CHUNK_CAPACITY: usize = 1024;

/// One fixed-capacity segment of a series' timestamp or value stream.
///
/// A chunk exposes a logical window `[start_offset, start_offset + count)`
/// over its backing storage. Front eviction advances `start_offset`
/// instead of shifting elements, and the `min`/`max` aggregates always
/// describe the logical window only.
///
/// A sealed chunk whose window is a single repeated numeric value may be
/// *compressed*: the backing storage is dropped and the constant is kept
/// in `min`. Any write access materializes the elements again first.
#[derive(Debug, Clone)]
pub struct Chunk<V> {
    values: Vec<V>,
    count: u32,
    start_offset: u32,
    min: f64,
    max: f64,
}

impl<V: Element> Chunk<V> {
    /// Create an empty chunk with backing storage reserved.
    pub fn new() -> Self {
        Self {
            values: Vec::with_capacity(CHUNK_CAPACITY),
            count: 0,
            start_offset: 0,
            min: f64::MAX,
            max: -f64::MAX,
        }
    }

    /// Number of elements in the logical window.
    pub fn len(&self) -> usize {
        self.count as usize
    }

    /// Check whether the logical window is empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Check whether the chunk can accept no further appends.
    pub fn is_full(&self) -> bool {
        self.is_compressed() || self.values.len() >= CHUNK_CAPACITY
    }

    /// Check whether the chunk is stored as a constant run.
    pub fn is_compressed(&self) -> bool {
        self.values.is_empty() && self.count > 0
    }

    /// Min/max aggregate over the logical window.
    ///
    /// Empty (inverted) for non-numeric element kinds, which skip
    /// aggregate tracking entirely.
    pub fn value_range(&self) -> Range {
        Range {
            min: self.min,
            max: self.max,
        }
    }

    /// Append an element to the back of the window.
    pub fn append(&mut self, value: V) {
        debug_assert!(!self.is_full());
        if let Some(scalar) = value.scalar() {
            if scalar < self.min {
                self.min = scalar;
            }
            if scalar > self.max {
                self.max = scalar;
            }
        }
        self.values.push(value);
        self.count += 1;
    }

    /// Read the element at a window-local index.
    pub fn value_at(&self, local: usize) -> Option<V> {
        if local >= self.count as usize {
            return None;
        }
        if self.is_compressed() {
            return V::from_scalar(self.min);
        }
        self.values.get(self.start_offset as usize + local).cloned()
    }

    /// Mutable access to the element at a window-local index.
    ///
    /// Write access always decompresses first: a mutation can no longer
    /// be represented as one constant.
    pub fn value_mut(&mut self, local: usize) -> Option<&mut V> {
        if local >= self.count as usize {
            return None;
        }
        self.decompress();
        self.values.get_mut(self.start_offset as usize + local)
    }

    /// Overwrite the element at a window-local index, returning the old
    /// element.
    ///
    /// Keeps the aggregates exact: the window is rescanned when the old
    /// element was a tracked extreme, otherwise the new scalar just
    /// expands the bound.
    pub fn set_value(&mut self, local: usize, value: V) -> Option<V> {
        let new_scalar = value.scalar();
        let slot = self.value_mut(local)?;
        let old = std::mem::replace(slot, value);
        match old.scalar() {
            Some(scalar) if scalar <= self.min || scalar >= self.max => {
                self.recompute_aggregates();
            }
            _ => {
                if let Some(scalar) = new_scalar {
                    if scalar < self.min {
                        self.min = scalar;
                    }
                    if scalar > self.max {
                        self.max = scalar;
                    }
                }
            }
        }
        Some(old)
    }

    /// Remove and return the oldest element of the window.
    ///
    /// Advances the window start; never shifts bytes. The chunk
    /// re-derives its aggregates when the removed element was a tracked
    /// extreme, so the aggregates stay exact for the remaining window.
    pub fn pop_front(&mut self) -> Option<V> {
        let popped = self.value_at(0)?;
        let was_compressed = self.is_compressed();
        self.count -= 1;
        if !was_compressed {
            self.start_offset += 1;
            if let Some(scalar) = popped.scalar()
                && (scalar <= self.min || scalar >= self.max)
            {
                self.recompute_aggregates();
            }
        }
        Some(popped)
    }

    /// Collapse a constant run into its compressed form.
    ///
    /// Only sealed chunks are offered for compression, and only numeric
    /// element kinds qualify. Returns whether the chunk is now
    /// compressed.
    pub fn try_compress(&mut self) -> bool {
        if self.is_compressed() {
            return true;
        }
        if self.count == 0 || self.min != self.max || V::from_scalar(self.min).is_none() {
            return false;
        }
        self.values = Vec::new();
        self.start_offset = 0;
        true
    }

    /// The logical window as a slice. Empty when compressed.
    pub fn logical_slice(&self) -> &[V] {
        if self.is_compressed() {
            return &[];
        }
        let start = self.start_offset as usize;
        &self.values[start..start + self.count as usize]
    }

    fn decompress(&mut self) {
        if !self.is_compressed() {
            return;
        }
        if let Some(constant) = V::from_scalar(self.min) {
            self.values = vec![constant; self.count as usize];
            self.start_offset = 0;
        }
    }

    fn recompute_aggregates(&mut self) {
        let mut min = f64::MAX;
        let mut max = -f64::MAX;
        for value in self.logical_slice() {
            if let Some(scalar) = value.scalar() {
                if scalar < min {
                    min = scalar;
                }
                if scalar > max {
                    max = scalar;
                }
            }
        }
        self.min = min;
        self.max = max;
    }
}

impl<V: Element> Default for Chunk<V> {
    fn default() -> Self {
        Self::new()
    }
}
