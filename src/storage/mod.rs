//! Chunked storage primitives.
//!
//! A series stream (timestamps or values) is a deque of fixed-capacity
//! chunks behind a flat logical index space. Chunks are shared
//! reference-counted handles: containers clone them before any write
//! when another owner exists, so cloned series and registry-interned
//! timestamp chunks stay isolated without copying on the read path.

mod array;
mod chunk;
mod element;
mod registry;

pub use array::ChunkedArray;
pub use chunk::{CHUNK_CAPACITY, Chunk};
pub use element::Element;
pub use registry::TimestampRegistry;
