//! Chunked containers with a flat logical index space.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::range::Range;
use crate::storage::chunk::{CHUNK_CAPACITY, Chunk};
use crate::storage::element::Element;

/// An ordered sequence of shared chunk handles presenting one flat,
/// logically indexed stream.
///
/// Every chunk except possibly the first and last is exactly full with
/// a zero window offset; the first chunk may carry a reduced window from
/// front eviction, and only the last chunk accepts appends. Logical
/// index mapping is O(1) with the first chunk's length as the only
/// special case.
///
/// Chunk handles are reference counted and may be aliased across
/// containers (a cloned container shares every chunk, and the timestamp
/// registry hands out shared handles). Every mutating path goes through
/// [`Arc::make_mut`], so a shared chunk is cloned before it is
/// written and the other owner is never disturbed.
#[derive(Debug, Clone)]
pub struct ChunkedArray<V: Element> {
    chunks: VecDeque<Arc<Chunk<V>>>,
    len: usize,
}

impl<V: Element> ChunkedArray<V> {
    /// Create an empty container.
    pub fn new() -> Self {
        Self {
            chunks: VecDeque::new(),
            len: 0,
        }
    }

    /// Total number of logical elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check whether the container holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of chunks currently backing the container.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Access a chunk handle by chunk index.
    pub fn chunk_handle(&self, index: usize) -> Option<&Arc<Chunk<V>>> {
        self.chunks.get(index)
    }

    /// Append an element, allocating a fresh chunk when the last one is
    /// full. Returns `true` when a previously open chunk was sealed by
    /// this append.
    pub fn push_back(&mut self, value: V) -> bool {
        let mut sealed = false;
        let needs_chunk = self.chunks.back().is_none_or(|chunk| chunk.is_full());
        if needs_chunk {
            if let Some(last) = self.chunks.back_mut() {
                Arc::make_mut(last).try_compress();
                sealed = true;
            }
            self.chunks.push_back(Arc::new(Chunk::new()));
        }
        if let Some(last) = self.chunks.back_mut() {
            Arc::make_mut(last).append(value);
        }
        self.len += 1;
        sealed
    }

    /// Remove and return the oldest element.
    ///
    /// The front chunk is cloned first when its handle is shared, and
    /// dropped entirely once its window drains.
    pub fn pop_front(&mut self) -> Option<V> {
        let front = self.chunks.front_mut()?;
        let popped = Arc::make_mut(front).pop_front()?;
        if front.is_empty() {
            self.chunks.pop_front();
        }
        self.len -= 1;
        Some(popped)
    }

    /// Read the element at a logical index.
    pub fn get(&self, index: usize) -> Option<V> {
        let (chunk_index, local) = self.locate(index)?;
        self.chunks[chunk_index].value_at(local)
    }

    /// Overwrite the element at a logical index, returning the old
    /// element. Forces decompression of a constant-run chunk and clones
    /// a shared chunk before writing.
    pub fn set(&mut self, index: usize, value: V) -> Option<V> {
        let (chunk_index, local) = self.locate(index)?;
        Arc::make_mut(&mut self.chunks[chunk_index]).set_value(local, value)
    }

    /// Insert an element at an arbitrary logical position.
    ///
    /// Interior inserts flatten the whole stream, splice, and rebuild
    /// chunk by chunk, which is intentionally O(n). They only happen on
    /// out-of-order arrivals; the hot append/evict paths stay O(1).
    pub fn insert(&mut self, index: usize, value: V) {
        if index >= self.len {
            self.push_back(value);
            return;
        }
        let mut flat: Vec<V> = self.iter().collect();
        flat.insert(index, value);
        self.rebuild(flat);
    }

    /// Drop all chunks.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.len = 0;
    }

    /// Iterate over all logical elements, front to back.
    pub fn iter(&self) -> impl Iterator<Item = V> + '_ {
        self.chunks
            .iter()
            .flat_map(|chunk| (0..chunk.len()).filter_map(move |i| chunk.value_at(i)))
    }

    /// Rebuild the container from a flat element sequence.
    ///
    /// Chunks filled along the way seal and compress as usual.
    pub fn rebuild(&mut self, flat: Vec<V>) {
        self.clear();
        for value in flat {
            self.push_back(value);
        }
        if let Some(last) = self.chunks.back_mut()
            && last.is_full()
        {
            Arc::make_mut(last).try_compress();
        }
    }

    /// The chunk sealed by the most recent append, if any.
    ///
    /// This is the second-to-last chunk, and only while it is still
    /// full. The registry uses it to swap in a shared handle without
    /// disturbing the open last chunk.
    pub fn last_sealed_chunk(&self) -> Option<(usize, &Arc<Chunk<V>>)> {
        if self.chunks.len() < 2 {
            return None;
        }
        let index = self.chunks.len() - 2;
        let chunk = &self.chunks[index];
        chunk.is_full().then_some((index, chunk))
    }

    /// Replace a chunk handle with an equivalent shared one.
    ///
    /// The replacement must describe the same logical elements; callers
    /// verify equality before swapping.
    pub fn replace_chunk(&mut self, index: usize, handle: Arc<Chunk<V>>) {
        debug_assert_eq!(self.chunks[index].len(), handle.len());
        self.chunks[index] = handle;
    }

    /// Union of all per-chunk aggregates.
    ///
    /// Cheap recompute path for value ranges: chunks keep their min/max
    /// even when compressed, so this never touches element storage.
    pub fn aggregate_range(&self) -> Range {
        self.chunks
            .iter()
            .fold(Range::EMPTY, |acc, chunk| Range::union(acc, chunk.value_range()))
    }

    fn locate(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.len {
            return None;
        }
        let first_len = self.chunks.front().map_or(0, |chunk| chunk.len());
        if index < first_len {
            return Some((0, index));
        }
        let rest = index - first_len;
        Some((1 + rest / CHUNK_CAPACITY, rest % CHUNK_CAPACITY))
    }
}

impl ChunkedArray<f64> {
    /// Index of the first element `>= x`, assuming the stream is sorted
    /// non-decreasing (timestamp streams are).
    ///
    /// Binary search over chunk maxima picks the candidate chunk, then a
    /// second binary search runs inside its logical window.
    pub fn lower_bound(&self, x: f64) -> usize {
        self.chunk_search(x, |value, x| value < x)
    }

    /// Index of the first element `> x`, assuming a sorted stream.
    pub fn upper_bound(&self, x: f64) -> usize {
        self.chunk_search(x, |value, x| value <= x)
    }

    /// First and last element, when present.
    pub fn front_back(&self) -> Option<(f64, f64)> {
        let front = self.get(0)?;
        let back = self.get(self.len - 1)?;
        Some((front, back))
    }

    fn chunk_search(&self, x: f64, before: impl Fn(f64, f64) -> bool) -> usize {
        // First chunk whose max is not before `x`.
        let mut lo = 0;
        let mut hi = self.chunks.len();
        while lo < hi {
            let mid = (lo + hi) / 2;
            if before(self.chunks[mid].value_range().max, x) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        if lo == self.chunks.len() {
            return self.len;
        }

        let base = self.chunk_base(lo);
        let chunk = &self.chunks[lo];
        if chunk.is_compressed() {
            let constant = chunk.value_range().min;
            return if before(constant, x) {
                base + chunk.len()
            } else {
                base
            };
        }
        let window = chunk.logical_slice();
        base + window.partition_point(|value| before(*value, x))
    }

    fn chunk_base(&self, chunk_index: usize) -> usize {
        if chunk_index == 0 {
            return 0;
        }
        let first_len = self.chunks.front().map_or(0, |chunk| chunk.len());
        first_len + (chunk_index - 1) * CHUNK_CAPACITY
    }
}

impl<V: Element> Default for ChunkedArray<V> {
    fn default() -> Self {
        Self::new()
    }
}
