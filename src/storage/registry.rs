//! Cross-series deduplication of sealed timestamp chunks.

use std::collections::HashMap;
use std::sync::Arc;

use xxhash_rust::xxh3::Xxh3;

use crate::storage::chunk::Chunk;

/// Content-addressed cache of sealed timestamp chunks.
///
/// Many series sampled on a common clock produce byte-identical
/// timestamp chunks; interning them collapses O(series × samples)
/// timestamp storage down to O(distinct streams × samples). The
/// registry is a cache, never authoritative: losing an entry only
/// forfeits a sharing opportunity.
///
/// Lives for one dataset session and is cleared with it.
#[derive(Debug, Default)]
pub struct TimestampRegistry {
    chunks: HashMap<u64, Arc<Chunk<f64>>>,
}

impl TimestampRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a just-sealed chunk; on a confirmed content match,
    /// return the already-registered shared handle.
    ///
    /// The hash is fast and non-cryptographic, so a hit is confirmed by
    /// comparing the raw element bits before any handle is shared;
    /// colliding chunks with distinct data must never merge. A miss
    /// registers the candidate.
    pub fn intern(&mut self, chunk: &Arc<Chunk<f64>>) -> Option<Arc<Chunk<f64>>> {
        if chunk.is_compressed() {
            // Constant runs already store no element data; nothing to share.
            return None;
        }
        let hash = content_hash(chunk.logical_slice());
        match self.chunks.get(&hash) {
            Some(existing) if same_content(existing, chunk) => {
                log::trace!("timestamp chunk dedup hit (hash {hash:#018x})");
                Some(Arc::clone(existing))
            }
            Some(_) => {
                log::debug!("timestamp chunk hash collision (hash {hash:#018x})");
                None
            }
            None => {
                self.chunks.insert(hash, Arc::clone(chunk));
                None
            }
        }
    }

    /// Number of registered chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Check whether no chunks are registered.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Drop every registered handle.
    pub fn clear(&mut self) {
        self.chunks.clear();
    }
}

fn content_hash(window: &[f64]) -> u64 {
    let mut hasher = Xxh3::new();
    for value in window {
        hasher.update(&value.to_le_bytes());
    }
    hasher.digest()
}

fn same_content(a: &Chunk<f64>, b: &Chunk<f64>) -> bool {
    let a = a.logical_slice();
    let b = b.logical_slice();
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.to_bits() == y.to_bits())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::chunk::CHUNK_CAPACITY;

    fn sealed_chunk(offset: f64) -> Arc<Chunk<f64>> {
        let mut chunk = Chunk::new();
        for i in 0..CHUNK_CAPACITY {
            chunk.append(offset + i as f64);
        }
        Arc::new(chunk)
    }

    #[test]
    fn identical_chunks_share_one_handle() {
        let mut registry = TimestampRegistry::new();
        let first = sealed_chunk(0.0);
        let second = sealed_chunk(0.0);

        assert!(registry.intern(&first).is_none());
        let shared = registry.intern(&second).expect("content match");
        assert!(Arc::ptr_eq(&shared, &first));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn distinct_chunks_register_separately() {
        let mut registry = TimestampRegistry::new();
        let first = sealed_chunk(0.0);
        let second = sealed_chunk(1.0);

        assert!(registry.intern(&first).is_none());
        assert!(registry.intern(&second).is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn clear_drops_all_handles() {
        let mut registry = TimestampRegistry::new();
        let chunk = sealed_chunk(0.0);
        registry.intern(&chunk);
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(Arc::strong_count(&chunk), 1);
    }
}
